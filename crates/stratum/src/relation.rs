use stratum_core::stmt::{Record, Value};

/// Outcome of diffing a collection-valued relation: the persisted child set
/// against the incoming one, keyed by child identity.
///
/// Children without an identity value are always additions. The diff is a
/// pure set computation; applying it is the update executor's job, so
/// re-computing against the post-apply state yields an empty diff
/// (idempotent re-apply).
#[derive(Debug, Default, PartialEq)]
pub struct RelationDiff {
    /// Incoming children absent from the persisted set (insert these).
    pub added: Vec<Record>,

    /// Identity values persisted but absent from the incoming set (sever or
    /// delete these).
    pub removed: Vec<Value>,

    /// Incoming children already persisted (update these under cascade,
    /// leave untouched under sync).
    pub retained: Vec<Record>,
}

impl RelationDiff {
    /// Diffs `incoming` child records against the `persisted` identity set.
    /// `id_field` names the child identity field within each record.
    pub fn compute(persisted: &[Value], incoming: &[Record], id_field: &str) -> Self {
        let mut diff = RelationDiff::default();

        for child in incoming {
            match child.get(id_field) {
                Some(id) if !id.is_null() && persisted.contains(id) => {
                    diff.retained.push(child.clone());
                }
                _ => diff.added.push(child.clone()),
            }
        }

        for id in persisted {
            let kept = incoming
                .iter()
                .any(|child| child.get(id_field) == Some(id));

            if !kept {
                diff.removed.push(id.clone());
            }
        }

        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.retained.is_empty()
    }
}
