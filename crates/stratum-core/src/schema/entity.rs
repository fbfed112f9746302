use super::{EntityBuilder, ExtendedTableDetails, FieldDetails, UniqueConstraintDetails};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Full metadata of one entity: table mapping, ordered fields, identity,
/// constraints, extension configuration and structural dependencies.
///
/// Constructed through [`EntityBuilder`]; never mutated afterwards. Shared
/// by reference from the registry for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDetails {
    pub(crate) name: String,
    pub(crate) table_name: String,
    pub(crate) fields: IndexMap<String, FieldDetails>,
    pub(crate) id_field: String,
    pub(crate) version_field: Option<String>,
    pub(crate) unique_constraints: Vec<UniqueConstraintDetails>,
    pub(crate) extended_table: Option<ExtendedTableDetails>,
    pub(crate) depends_on: BTreeSet<String>,
}

impl EntityDetails {
    pub fn builder(name: impl Into<String>, table_name: impl Into<String>) -> EntityBuilder {
        EntityBuilder::new(name, table_name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDetails> {
        self.fields.values()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDetails> {
        self.fields.get(name)
    }

    pub fn field_by_column(&self, column: &str) -> Option<&FieldDetails> {
        self.fields.values().find(|field| field.column == column)
    }

    pub fn id_field(&self) -> &FieldDetails {
        &self.fields[&self.id_field]
    }

    pub fn has_version_field(&self) -> bool {
        self.version_field.is_some()
    }

    pub fn version_field(&self) -> Option<&FieldDetails> {
        self.version_field.as_ref().map(|name| &self.fields[name])
    }

    pub fn relation_fields(&self) -> impl Iterator<Item = &FieldDetails> {
        self.fields.values().filter(|field| field.is_relation_field())
    }

    pub fn unique_constraints(&self) -> &[UniqueConstraintDetails] {
        &self.unique_constraints
    }

    pub fn is_extendable(&self) -> bool {
        self.extended_table.is_some()
    }

    pub fn extended_table(&self) -> Option<&ExtendedTableDetails> {
        self.extended_table.as_ref()
    }

    /// Entities whose tables must exist before this entity's table can be
    /// created (owned foreign keys).
    pub fn depends_on(&self) -> impl Iterator<Item = &str> {
        self.depends_on.iter().map(String::as_str)
    }

    /// Resolves a dotted field path (`created_by.name`) through nested
    /// object sub-fields.
    pub fn resolve_path(&self, path: &str) -> Option<&FieldDetails> {
        let mut steps = path.split('.');
        let mut field = self.field(steps.next()?)?;

        for step in steps {
            field = field.sub_field(step)?;
        }

        Some(field)
    }
}
