use super::{persist, ExecutionContext, Executor, MethodCall};
use crate::listener::EntityEventType;
use crate::repository::{MethodDescriptor, ResultShape};
use stratum_core::schema::{EntityDetails, ExtendedTableDetails};
use stratum_core::stmt::{ColumnValue, InsertQuery, Record, Value};
use stratum_core::Result;
use std::sync::Arc;

/// Persists a full entity record: constraint validation, lifecycle events,
/// the row insert, generated-id fetch and extension-field routing.
pub(super) struct SaveExecutor {
    entity: Arc<EntityDetails>,
    entity_param: usize,
    auto_fetch_id: bool,
    result: ResultShape,
}

pub(super) fn construct(
    _repository: &str,
    descriptor: &MethodDescriptor,
    entity: Arc<EntityDetails>,
) -> Result<Box<dyn Executor>> {
    Ok(Box::new(SaveExecutor {
        entity,
        entity_param: descriptor.entity_param.unwrap_or(0),
        auto_fetch_id: descriptor.auto_fetch_id,
        result: descriptor.result,
    }))
}

impl SaveExecutor {
    fn persist_extension_row(
        &self,
        ctx: &ExecutionContext,
        ext: &ExtendedTableDetails,
        id: &Value,
        columns: Vec<ColumnValue>,
    ) -> Result<()> {
        let mut query = InsertQuery::new(&ext.table_name);
        query.columns = vec![ColumnValue::new(
            ExtendedTableDetails::ENTITY_ID_COLUMN,
            id.clone(),
        )];
        query.columns.extend(columns);

        ctx.data_store.insert(&query, &self.entity)?;
        Ok(())
    }
}

impl Executor for SaveExecutor {
    fn execute(&self, ctx: &ExecutionContext, call: &MethodCall<'_>) -> Result<Value> {
        let record = persist::record_param(call.param(self.entity_param)?)?;
        let entity = &self.entity;

        persist::check_unique_constraints(ctx, entity, record, None)?;
        persist::check_foreign_constraints(ctx, entity, record)?;

        let extension_columns = persist::split_extension_columns(entity, record)?;

        if ctx
            .listeners
            .is_listener_present(entity.name(), EntityEventType::PreSave)
        {
            let data = Value::Record(record.clone());
            ctx.listeners
                .handle_event_type(entity.name(), EntityEventType::PreSave, &data);
        }

        let id_field = entity.id_field();
        let id_value = record.get(&id_field.name).cloned().unwrap_or(Value::Null);
        let generate_id = self.auto_fetch_id && id_value.is_null();

        let mut query = InsertQuery::new(entity.table_name());
        query.columns = persist::record_columns(ctx, entity, record)?;
        query.fetch_generated_id = generate_id;

        if generate_id {
            query.columns.retain(|column| column.column != id_field.column);
        }

        let outcome = ctx.data_store.insert(&query, entity)?;

        let id_value = match outcome.generated_key {
            Some(key) => key,
            None => id_value,
        };

        if !extension_columns.is_empty() {
            // metadata guarantees extendable here
            if let Some(ext) = entity.extended_table() {
                self.persist_extension_row(ctx, ext, &id_value, extension_columns)?;
            }
        }

        let saved = || -> Record {
            let mut saved = record.clone();
            saved.insert(id_field.name.clone(), id_value.clone());
            saved
        };

        if ctx
            .listeners
            .is_listener_present(entity.name(), EntityEventType::PostSave)
        {
            let data = Value::Record(saved());
            ctx.listeners
                .handle_event_type(entity.name(), EntityEventType::PostSave, &data);
        }

        Ok(match self.result {
            ResultShape::Unit => Value::Null,
            ResultShape::Count => Value::I64(outcome.affected as i64),
            ResultShape::Scalar => id_value,
            ResultShape::One | ResultShape::OptionalOne | ResultShape::Many => {
                Value::Record(saved())
            }
            ResultShape::Bool => Value::Bool(outcome.affected > 0),
        })
    }
}
