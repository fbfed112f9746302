use super::{condition, ExecutionContext, Executor, MethodCall};
use crate::repository::{ConditionDecl, MethodDescriptor, ResultShape};
use stratum_core::schema::EntityDetails;
use stratum_core::stmt::{AggregateFunction, AggregateQuery, Value};
use stratum_core::Result;
use std::sync::Arc;

/// Compiles the method's condition tree into a `COUNT` aggregate.
pub(super) struct CountExecutor {
    entity: Arc<EntityDetails>,
    conditions: Vec<ConditionDecl>,
    result: ResultShape,
}

pub(super) fn construct(
    repository: &str,
    descriptor: &MethodDescriptor,
    entity: Arc<EntityDetails>,
) -> Result<Box<dyn Executor>> {
    condition::validate(&descriptor.conditions, &entity, repository, &descriptor.name)?;

    Ok(Box::new(CountExecutor {
        entity,
        conditions: descriptor.conditions.clone(),
        result: descriptor.result,
    }))
}

impl Executor for CountExecutor {
    fn execute(&self, ctx: &ExecutionContext, call: &MethodCall<'_>) -> Result<Value> {
        let conditions = condition::bind(&self.conditions, &self.entity, &ctx.conversion, call)?;

        let mut query = AggregateQuery::new(
            self.entity.table_name(),
            AggregateFunction::Count,
            self.entity.id_field().column.clone(),
        );
        query.conditions = conditions;

        let count = ctx.data_store.aggregate(&query, &self.entity)?.to_i64()?;

        Ok(match self.result {
            ResultShape::Bool => Value::Bool(count > 0),
            _ => Value::I64(count),
        })
    }
}
