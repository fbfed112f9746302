use super::{condition, persist, ExecutionContext, Executor, MethodCall};
use crate::repository::{ConditionDecl, MethodDescriptor, ResultShape};
use stratum_core::driver::Row;
use stratum_core::schema::{EntityDetails, FieldDetails};
use stratum_core::stmt::{OrderByField, OrderByType, SelectQuery, Value};
use stratum_core::{ConversionService, Error, Result};
use std::sync::Arc;

/// Compiles conditions, projection and ordering into a row query and shapes
/// the fetched rows per the declared result shape.
pub(super) struct FinderExecutor {
    label: String,
    entity: Arc<EntityDetails>,
    conditions: Vec<ConditionDecl>,
    fields: Vec<(String, FieldDetails)>,
    order_by: Vec<OrderByField>,
    result: ResultShape,
}

/// Resolves declared order-by field paths to their backing columns.
pub(super) fn resolve_order_by(
    declared: &[(String, OrderByType)],
    entity: &EntityDetails,
    repository: &str,
    method: &str,
) -> Result<Vec<OrderByField>> {
    declared
        .iter()
        .map(|(path, order)| {
            entity
                .resolve_path(path)
                .map(|field| OrderByField::new(field.column.clone(), *order))
                .ok_or_else(|| {
                    Error::repository(format!(
                        "method `{method}` of repository `{repository}` orders by unknown \
                         field path `{path}` of entity `{}`",
                        entity.name()
                    ))
                })
        })
        .collect()
}

pub(super) fn construct(
    repository: &str,
    descriptor: &MethodDescriptor,
    entity: Arc<EntityDetails>,
) -> Result<Box<dyn Executor>> {
    condition::validate(&descriptor.conditions, &entity, repository, &descriptor.name)?;

    let fields = persist::result_fields(&entity, &descriptor.projection, repository, &descriptor.name)?;
    let order_by = resolve_order_by(&descriptor.order_by, &entity, repository, &descriptor.name)?;

    Ok(Box::new(FinderExecutor {
        label: format!("method `{}` of repository `{repository}`", descriptor.name),
        entity,
        conditions: descriptor.conditions.clone(),
        fields,
        order_by,
        result: descriptor.result,
    }))
}

/// Shapes fetched rows into the declared result form. Single-record shapes
/// enforce cardinality; `One` demands a row, `OptionalOne`/`Scalar` tolerate
/// none.
pub(super) fn shape_rows(
    rows: Vec<Row>,
    fields: &[(String, FieldDetails)],
    conversion: &ConversionService,
    result: ResultShape,
    label: &str,
) -> Result<Value> {
    match result {
        ResultShape::Unit => Ok(Value::Null),
        ResultShape::Bool => Ok(Value::Bool(!rows.is_empty())),
        ResultShape::Count => Ok(Value::I64(rows.len() as i64)),
        ResultShape::Many => {
            let records = rows
                .iter()
                .map(|row| {
                    persist::row_to_record(row, fields, conversion).map(Value::Record)
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::List(records))
        }
        ResultShape::One | ResultShape::OptionalOne | ResultShape::Scalar => {
            if rows.len() > 1 {
                return Err(Error::too_many_records(label.to_string()));
            }

            let Some(row) = rows.first() else {
                return match result {
                    ResultShape::One => Err(Error::record_not_found(label.to_string())),
                    _ => Ok(Value::Null),
                };
            };

            let record = persist::row_to_record(row, fields, conversion)?;

            if result == ResultShape::Scalar {
                let Some((path, _)) = fields.first() else {
                    return Ok(Value::Null);
                };
                return Ok(record.entry(path).cloned().unwrap_or(Value::Null));
            }

            Ok(Value::Record(record))
        }
    }
}

impl Executor for FinderExecutor {
    fn execute(&self, ctx: &ExecutionContext, call: &MethodCall<'_>) -> Result<Value> {
        let conditions = condition::bind(&self.conditions, &self.entity, &ctx.conversion, call)?;

        let mut query = SelectQuery::new(self.entity.table_name());
        query.columns = persist::select_columns(&self.fields);
        query.conditions = conditions;
        query.order_by = self.order_by.clone();

        // single-record shapes only need to see a second row to fail
        if matches!(
            self.result,
            ResultShape::One | ResultShape::OptionalOne | ResultShape::Scalar
        ) {
            query.limit = Some(2);
        }

        let rows = ctx.data_store.execute_query(&query, &self.entity)?;
        shape_rows(rows, &self.fields, &ctx.conversion, self.result, &self.label)
    }
}
