use super::{JoinOperator, Operator, Value};

/// One bound predicate: `path <op> value`.
///
/// `path` is the entity field path, dotted for nested object fields
/// (`created_by.name`). A `Null` value combined with `Eq`/`Ne` is the
/// explicit `IS [NOT] NULL` form; drivers are expected to render it that
/// way. `ignore_case` requests case-insensitive comparison for string
/// operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub path: String,
    pub op: Operator,
    pub ignore_case: bool,
    pub value: Value,
}

impl Condition {
    pub fn new(path: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            op,
            ignore_case: false,
            value: value.into(),
        }
    }

    pub fn is_null_check(&self) -> bool {
        self.value.is_null() && matches!(self.op, Operator::Eq | Operator::Ne)
    }
}

/// A predicate joined to the node before it within a group.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionNode {
    /// Join operator linking this node to the previous one. Ignored for the
    /// first node of a group.
    pub join: JoinOperator,
    pub expr: ConditionExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConditionExpr {
    Condition(Condition),
    Group(ConditionGroup),
}

/// An ordered tree of conditions mirroring a boolean expression, supporting
/// nested OR groups joined by AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionGroup {
    nodes: Vec<ConditionNode>,
}

impl ConditionGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn push(&mut self, join: JoinOperator, condition: Condition) {
        self.nodes.push(ConditionNode {
            join,
            expr: ConditionExpr::Condition(condition),
        });
    }

    pub fn push_group(&mut self, join: JoinOperator, group: ConditionGroup) {
        if group.is_empty() {
            return;
        }

        self.nodes.push(ConditionNode {
            join,
            expr: ConditionExpr::Group(group),
        });
    }

    pub fn nodes(&self) -> &[ConditionNode] {
        &self.nodes
    }

    /// Depth-first iteration over leaf conditions.
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        let mut stack: Vec<&ConditionNode> = self.nodes.iter().rev().collect();

        std::iter::from_fn(move || loop {
            match stack.pop()?.expr {
                ConditionExpr::Condition(ref condition) => return Some(condition),
                ConditionExpr::Group(ref group) => {
                    stack.extend(group.nodes.iter().rev());
                }
            }
        })
    }
}
