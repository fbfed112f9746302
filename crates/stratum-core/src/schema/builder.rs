use super::{
    DataType, EntityDetails, ExtendedTableDetails, FieldDetails, RelationDetails, RustType,
    UniqueConstraintDetails,
};
use crate::conversion::ConverterId;
use crate::{Error, Result};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Declares one persistent field. Collected by [`EntityBuilder`].
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    name: String,
    column: Option<String>,
    rust_type: RustType,
    data_type: Option<DataType>,
    nullable: bool,
    updateable: bool,
    id: bool,
    version: bool,
    relation: Option<RelationDetails>,
    converter: Option<ConverterId>,
    sub_fields: Vec<FieldBuilder>,
}

impl FieldBuilder {
    pub fn new(name: impl Into<String>, rust_type: RustType) -> Self {
        Self {
            name: name.into(),
            column: None,
            rust_type,
            data_type: None,
            nullable: true,
            updateable: true,
            id: false,
            version: false,
            relation: None,
            converter: None,
            sub_fields: vec![],
        }
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Overrides the inferred storage type (`ZipBlob` for a compressed blob,
    /// `Clob` for a file-backed character stream, ...).
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn not_updateable(mut self) -> Self {
        self.updateable = false;
        self
    }

    pub fn id(mut self) -> Self {
        self.id = true;
        self
    }

    pub fn version(mut self) -> Self {
        self.version = true;
        self
    }

    pub fn relation(mut self, relation: RelationDetails) -> Self {
        self.relation = Some(relation);
        self
    }

    pub fn converter(mut self, converter: ConverterId) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn sub_field(mut self, field: FieldBuilder) -> Self {
        self.sub_fields.push(field);
        self
    }

    fn build(self, entity: &str) -> Result<FieldDetails> {
        let name = self.name;

        match &self.rust_type {
            RustType::Object(_) if self.sub_fields.is_empty() && self.converter.is_none() => {
                return Err(Error::configuration(format!(
                    "field `{name}` of entity `{entity}` has object type with neither \
                     sub-fields nor an explicit converter"
                )));
            }
            RustType::Entity(_) | RustType::EntityList(_) if self.relation.is_none() => {
                return Err(Error::configuration(format!(
                    "field `{name}` of entity `{entity}` has an entity type but no relation \
                     details"
                )));
            }
            _ => {}
        }

        if self.relation.is_some() && !self.rust_type.is_relation() {
            return Err(Error::configuration(format!(
                "field `{name}` of entity `{entity}` declares relation details on a \
                 non-entity type"
            )));
        }

        if self.version && !self.rust_type.is_integral() {
            return Err(Error::configuration(format!(
                "version field `{name}` of entity `{entity}` must be an integer type"
            )));
        }

        let mut sub_fields = None;

        if !self.sub_fields.is_empty() {
            let mut map = IndexMap::new();

            for sub in self.sub_fields {
                let sub = sub.build(entity)?;

                if map.insert(sub.name.clone(), sub).is_some() {
                    return Err(Error::configuration(format!(
                        "field `{name}` of entity `{entity}` declares a duplicate sub-field"
                    )));
                }
            }

            sub_fields = Some(map);
        }

        let data_type = self
            .data_type
            .unwrap_or_else(|| DataType::of(&self.rust_type));

        Ok(FieldDetails {
            column: self.column.unwrap_or_else(|| name.to_uppercase()),
            name,
            data_type,
            rust_type: self.rust_type,
            // identity is never nullable
            nullable: self.nullable && !self.id,
            updateable: self.updateable && !self.id,
            id_field: self.id,
            version_field: self.version,
            relation: self.relation,
            converter: self.converter,
            sub_fields,
        })
    }
}

/// Builds and validates [`EntityDetails`]. All configuration errors surface
/// here, at metadata-build time.
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    name: String,
    table_name: String,
    fields: Vec<FieldBuilder>,
    unique_constraints: Vec<UniqueConstraintDetails>,
    extended_table: Option<ExtendedTableDetails>,
}

impl EntityBuilder {
    pub fn new(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            fields: vec![],
            unique_constraints: vec![],
            extended_table: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.fields.push(field);
        self
    }

    pub fn unique_constraint(mut self, constraint: UniqueConstraintDetails) -> Self {
        self.unique_constraints.push(constraint);
        self
    }

    /// Marks the entity extendable with `count` reserved extension columns.
    pub fn extendable(mut self, count: u32) -> Self {
        self.extended_table = Some(ExtendedTableDetails::new(&self.table_name, count));
        self
    }

    pub fn extendable_with(mut self, details: ExtendedTableDetails) -> Self {
        self.extended_table = Some(details);
        self
    }

    pub fn build(self) -> Result<EntityDetails> {
        let entity = &self.name;
        let mut fields = IndexMap::new();

        for field in self.fields {
            let field = field.build(entity)?;

            if fields.contains_key(&field.name) {
                return Err(Error::configuration(format!(
                    "entity `{entity}` declares field `{}` more than once",
                    field.name
                )));
            }

            fields.insert(field.name.clone(), field);
        }

        let id_fields: Vec<_> = fields
            .values()
            .filter(|field| field.id_field)
            .map(|field| field.name.clone())
            .collect();

        let id_field = match id_fields.as_slice() {
            [single] => single.clone(),
            [] => {
                return Err(Error::configuration(format!(
                    "entity `{entity}` declares no identity field"
                )))
            }
            multiple => {
                return Err(Error::configuration(format!(
                    "entity `{entity}` declares redundant identity fields: {}",
                    multiple.join(", ")
                )))
            }
        };

        let version_fields: Vec<_> = fields
            .values()
            .filter(|field| field.version_field)
            .map(|field| field.name.clone())
            .collect();

        let version_field = match version_fields.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            multiple => {
                return Err(Error::configuration(format!(
                    "entity `{entity}` declares multiple version fields: {}",
                    multiple.join(", ")
                )))
            }
        };

        for constraint in &self.unique_constraints {
            if constraint.fields.is_empty() {
                return Err(Error::configuration(format!(
                    "unique constraint `{}` of entity `{entity}` spans no fields",
                    constraint.name
                )));
            }

            for field in &constraint.fields {
                if !fields.contains_key(field) {
                    return Err(Error::configuration(format!(
                        "unique constraint `{}` of entity `{entity}` references unknown \
                         field `{field}`",
                        constraint.name
                    )));
                }
            }
        }

        if let Some(ext) = &self.extended_table {
            if ext.count == 0 || ext.field_size == 0 {
                return Err(Error::configuration(format!(
                    "entity `{entity}` declares an extension table with an empty envelope"
                )));
            }
        }

        let depends_on: BTreeSet<String> = fields
            .values()
            .filter(|field| field.is_table_owned())
            .filter_map(|field| field.relation.as_ref())
            .map(|relation| relation.target_entity.clone())
            .collect();

        Ok(EntityDetails {
            name: self.name,
            table_name: self.table_name,
            fields,
            id_field,
            version_field,
            unique_constraints: self.unique_constraints,
            extended_table: self.extended_table,
            depends_on,
        })
    }
}
