use super::ExecutionContext;
use stratum_core::driver::Row;
use stratum_core::schema::EntityDetails;
use stratum_core::schema::FieldDetails;
use stratum_core::stmt::{
    ColumnValue, Condition, ConditionGroup, JoinOperator, Operator, Record, ResultField,
    SelectQuery, Value,
};
use stratum_core::{ConversionService, Error, Result};

/// Flattened `(path, field)` pairs for every column on the entity's own
/// table: plain fields, owned foreign keys, and nested object sub-fields
/// addressed by dotted path. Collection relations have no column here.
pub(super) fn table_fields(entity: &EntityDetails) -> Vec<(String, &FieldDetails)> {
    let mut out = Vec::new();
    for field in entity.fields() {
        collect("", field, &mut out);
    }
    out
}

fn collect<'a>(prefix: &str, field: &'a FieldDetails, out: &mut Vec<(String, &'a FieldDetails)>) {
    if field.is_relation_field() && !field.is_table_owned() {
        return;
    }

    let path = if prefix.is_empty() {
        field.name.clone()
    } else {
        format!("{prefix}.{}", field.name)
    };

    match &field.sub_fields {
        Some(subs) => {
            for sub in subs.values() {
                collect(&path, sub, out);
            }
        }
        None => out.push((path, field)),
    }
}

/// Resolves a projection to owned `(path, field)` pairs; an empty projection
/// selects every table-backed field.
pub(super) fn result_fields(
    entity: &EntityDetails,
    projection: &[String],
    repository: &str,
    method: &str,
) -> Result<Vec<(String, FieldDetails)>> {
    if projection.is_empty() {
        return Ok(table_fields(entity)
            .into_iter()
            .map(|(path, field)| (path, field.clone()))
            .collect());
    }

    projection
        .iter()
        .map(|path| {
            entity
                .resolve_path(path)
                .map(|field| (path.clone(), field.clone()))
                .ok_or_else(|| {
                    Error::repository(format!(
                        "method `{method}` of repository `{repository}` projects unknown \
                         field path `{path}` of entity `{}`",
                        entity.name()
                    ))
                })
        })
        .collect()
}

pub(super) fn select_columns(fields: &[(String, FieldDetails)]) -> Vec<ResultField> {
    fields
        .iter()
        .map(|(path, field)| ResultField::new(path.clone(), field.column.clone()))
        .collect()
}

/// Assembles one driver row into a runtime record, converting each column
/// back to its native type. Dotted paths rebuild nested object records.
pub(super) fn row_to_record(
    row: &Row,
    fields: &[(String, FieldDetails)],
    conversion: &ConversionService,
) -> Result<Record> {
    let mut record = Record::new();

    for (path, field) in fields {
        let stored = row.get(&field.column).cloned().unwrap_or(Value::Null);
        // an owned-relation column carries the raw foreign key; its typing
        // belongs to the target entity, so it is not coerced here
        let value = if field.is_relation_field() {
            stored
        } else {
            conversion.to_rust(&stored, field)?
        };
        insert_path(&mut record, path, value);
    }

    Ok(record)
}

fn insert_path(record: &mut Record, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            record.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(record.get(head), Some(Value::Record(_))) {
                record.insert(head, Value::Record(Record::new()));
            }

            if let Some(Value::Record(nested)) = record.get_mut(head) {
                insert_path(nested, rest, value);
            }
        }
    }
}

/// Reduces an owned-relation value to the foreign-key value: a full target
/// record yields its identity value, anything else is already the key.
pub(super) fn relation_key(
    ctx: &ExecutionContext,
    field: &FieldDetails,
    value: &Value,
) -> Result<Value> {
    let Some(relation) = &field.relation else {
        return Ok(value.clone());
    };

    match value {
        Value::Record(nested) => {
            let target = ctx.registry.get(&relation.target_entity)?;
            Ok(nested
                .get(&target.id_field().name)
                .cloned()
                .unwrap_or(Value::Null))
        }
        other => Ok(other.clone()),
    }
}

/// Converts a runtime record into the column/value list of a write, covering
/// every table-backed field. Owned relations reduce to their key value.
pub(super) fn record_columns(
    ctx: &ExecutionContext,
    entity: &EntityDetails,
    record: &Record,
) -> Result<Vec<ColumnValue>> {
    let mut columns = Vec::new();

    for (path, field) in table_fields(entity) {
        let value = record.entry(&path).cloned().unwrap_or(Value::Null);
        let value = if field.is_relation_field() {
            relation_key(ctx, field, &value)?
        } else {
            value
        };

        let stored = ctx.conversion.to_storage(&value, field)?;
        columns.push(ColumnValue::new(field.column.clone(), stored));
    }

    Ok(columns)
}

/// The record parameter of a persist method.
pub(super) fn record_param(value: &Value) -> Result<&Record> {
    value.as_record().ok_or_else(|| {
        Error::repository(format!(
            "persist method expects an entity record parameter, got {}",
            value.variant_name()
        ))
    })
}

/// Pre-write unique validation, for stores that cannot enforce uniqueness
/// themselves. Queries for a clashing row per declared constraint; a clash
/// surfaces the constraint's declared message. `exclude_id` skips the row
/// being updated.
pub(super) fn check_unique_constraints(
    ctx: &ExecutionContext,
    entity: &EntityDetails,
    record: &Record,
    exclude_id: Option<&Value>,
) -> Result<()> {
    if !ctx.data_store.capability().explicit_unique_check {
        return Ok(());
    }

    for constraint in entity.unique_constraints() {
        if !constraint.validate_before_write {
            continue;
        }

        let mut conditions = ConditionGroup::new();

        for field_name in &constraint.fields {
            let Some(field) = entity.field(field_name) else {
                // constraint fields were validated at metadata build
                continue;
            };

            let value = record.get(field_name).cloned().unwrap_or(Value::Null);
            let stored = ctx.conversion.to_storage(&value, field)?;
            conditions.push(
                JoinOperator::And,
                Condition::new(field_name.clone(), Operator::Eq, stored),
            );
        }

        if let Some(id) = exclude_id {
            conditions.push(
                JoinOperator::And,
                Condition::new(entity.id_field().name.clone(), Operator::Ne, id.clone()),
            );
        }

        let id_field = entity.id_field();
        let mut query = SelectQuery::new(entity.table_name());
        query.columns = vec![ResultField::new(&id_field.name, &id_field.column)];
        query.conditions = conditions;
        query.limit = Some(1);

        let rows = ctx.data_store.execute_query(&query, entity)?;

        if !rows.is_empty() {
            return Err(Error::unique_constraint(
                constraint.storage_name(entity.table_name()),
                constraint.message.as_str(),
            ));
        }
    }

    Ok(())
}

/// Pre-write foreign-key validation: every non-null owned relation value must
/// reference an existing target row.
pub(super) fn check_foreign_constraints(
    ctx: &ExecutionContext,
    entity: &EntityDetails,
    record: &Record,
) -> Result<()> {
    if !ctx.data_store.capability().explicit_foreign_check {
        return Ok(());
    }

    for field in entity.relation_fields().filter(|field| field.is_table_owned()) {
        let Some(relation) = &field.relation else {
            continue;
        };

        let value = match record.get(&field.name) {
            Some(value) if !value.is_null() => value,
            _ => continue,
        };

        let target = ctx.registry.get(&relation.target_entity)?;
        let target_id = target.id_field();

        // the relation value is either the raw key or a full target record
        let key = match value {
            Value::Record(nested) => nested.get(&target_id.name).cloned().unwrap_or(Value::Null),
            other => other.clone(),
        };

        if key.is_null() {
            continue;
        }

        let stored = ctx.conversion.to_storage(&key, target_id)?;
        let mut query = SelectQuery::new(target.table_name());
        query.columns = vec![ResultField::new(&target_id.name, &target_id.column)];
        query
            .conditions
            .push(JoinOperator::And, Condition::new(&target_id.name, Operator::Eq, stored));
        query.limit = Some(1);

        let rows = ctx.data_store.execute_query(&query, &target)?;

        if rows.is_empty() {
            return Err(Error::foreign_constraint(format!(
                "field `{}` of entity `{}` references a missing `{}` row",
                field.name,
                entity.name(),
                relation.target_entity
            )));
        }
    }

    Ok(())
}

/// Routes record fields unknown to the entity metadata into extension-table
/// columns. A non-extendable entity with unknown fields, or more unknown
/// fields than reserved columns, is a configuration error.
pub(super) fn split_extension_columns(
    entity: &EntityDetails,
    record: &Record,
) -> Result<Vec<ColumnValue>> {
    let extra: Vec<(&str, &Value)> = record
        .iter()
        .filter(|(name, _)| !entity.has_field(name))
        .collect();

    if extra.is_empty() {
        return Ok(vec![]);
    }

    let Some(ext) = entity.extended_table() else {
        return Err(Error::configuration(format!(
            "entity `{}` is not extendable, record carries unknown field `{}`",
            entity.name(),
            extra[0].0
        )));
    };

    if extra.len() > ext.count as usize {
        return Err(Error::configuration(format!(
            "entity `{}` reserves {} extension columns, record carries {} unknown fields \
             (first: `{}`)",
            entity.name(),
            ext.count,
            extra.len(),
            extra[0].0
        )));
    }

    Ok(extra
        .into_iter()
        .enumerate()
        .map(|(index, (_, value))| {
            ColumnValue::new(ext.column_name(index as u32), value.clone())
        })
        .collect())
}
