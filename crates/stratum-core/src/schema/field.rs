use super::{DataType, RustType};
use crate::conversion::ConverterId;
use indexmap::IndexMap;

/// One persistent field of an entity. Owned by its [`super::EntityDetails`];
/// immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDetails {
    /// The field name
    pub name: String,

    /// Backing column name
    pub column: String,

    /// Storage type the column is declared as
    pub data_type: DataType,

    /// Native type the runtime value carries
    pub rust_type: RustType,

    /// True if the column accepts null
    pub nullable: bool,

    /// False for fields excluded from full-entity updates
    pub updateable: bool,

    /// True if the field is the entity identity
    pub id_field: bool,

    /// True for the optimistic-version column, incremented on every update
    pub version_field: bool,

    /// Present when the field is a foreign-key or collection relation
    pub relation: Option<RelationDetails>,

    /// Explicit converter overriding implicit/default conversion
    pub converter: Option<ConverterId>,

    /// Sub-field map for nested value objects, used to resolve dotted
    /// condition paths
    pub sub_fields: Option<IndexMap<String, FieldDetails>>,
}

impl FieldDetails {
    pub fn is_relation_field(&self) -> bool {
        self.relation.is_some()
    }

    /// True when the relation's foreign-key column lives on this entity's
    /// own table.
    pub fn is_table_owned(&self) -> bool {
        self.relation
            .as_ref()
            .map(|relation| relation.owned_by_table)
            .unwrap_or(false)
    }

    pub fn sub_field(&self, name: &str) -> Option<&FieldDetails> {
        self.sub_fields.as_ref()?.get(name)
    }
}

/// Reconciliation policy for a collection-valued relation on update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelationUpdateType {
    /// The relation is left untouched by entity updates.
    #[default]
    None,

    /// Diff persisted vs. incoming; insert added, sever removed (FK nulled
    /// or join row deleted), leave unchanged untouched.
    SyncRelation,

    /// Like sync, but removed sub-entities are deleted outright and changed
    /// ones are updated.
    Cascade,
}

/// Relation metadata of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDetails {
    /// Entity the relation targets
    pub target_entity: String,

    /// True when the FK column lives on this table; false when the target
    /// table (or a join table) holds it
    pub owned_by_table: bool,

    /// Column on the target entity's table referencing this entity, for
    /// relations this table does not own
    pub child_key_column: Option<String>,

    /// Reconciliation policy applied during full-entity updates
    pub update_type: RelationUpdateType,

    /// True when deleting the parent must delete rows of this relation first
    pub delete_with_parent: bool,
}

impl RelationDetails {
    /// An owned many-to-one relation: the FK column is on this table.
    pub fn owned(target_entity: impl Into<String>) -> Self {
        Self {
            target_entity: target_entity.into(),
            owned_by_table: true,
            child_key_column: None,
            update_type: RelationUpdateType::None,
            delete_with_parent: false,
        }
    }

    /// A one-to-many relation: the FK column is on the child table.
    pub fn children(target_entity: impl Into<String>, child_key_column: impl Into<String>) -> Self {
        Self {
            target_entity: target_entity.into(),
            owned_by_table: false,
            child_key_column: Some(child_key_column.into()),
            update_type: RelationUpdateType::None,
            delete_with_parent: false,
        }
    }

    pub fn update_type(mut self, update_type: RelationUpdateType) -> Self {
        self.update_type = update_type;
        self
    }

    pub fn delete_with_parent(mut self) -> Self {
        self.delete_with_parent = true;
        self
    }
}
