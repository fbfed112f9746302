use super::{condition, ExecutionContext, Executor, MethodCall};
use crate::listener::EntityEventType;
use crate::repository::{ConditionDecl, MethodDescriptor, ResultShape};
use stratum_core::schema::{EntityDetails, ExtendedTableDetails};
use stratum_core::stmt::{
    Condition, ConditionGroup, DeleteQuery, JoinOperator, Operator, ResultField, SelectQuery,
    Value,
};
use stratum_core::{Error, Result};
use std::sync::Arc;

/// Deletes matching rows, removing dependent child rows and extension rows
/// first so the parent delete never leaves orphans behind.
pub(super) struct DeleteExecutor {
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

    Ok(Box::new(DeleteExecutor {
        entity,
        conditions: descriptor.conditions.clone(),
        result: descriptor.result,
    }))
}

impl DeleteExecutor {
    /// Fetches the identity values of the rows the conditions select.
    fn matching_ids(&self, ctx: &ExecutionContext, conditions: &ConditionGroup) -> Result<Vec<Value>> {
        let id_field = self.entity.id_field();

        let mut query = SelectQuery::new(self.entity.table_name());
        query.columns = vec![ResultField::new(&id_field.name, &id_field.column)];
        query.conditions = conditions.clone();

        let rows = ctx.data_store.execute_query(&query, &self.entity)?;

        Ok(rows
            .iter()
            .map(|row| row.get(&id_field.column).cloned().unwrap_or(Value::Null))
            .collect())
    }

    /// Deletes rows of child relations marked `delete_with_parent`, keyed by
    /// the parent ids about to go away.
    fn delete_children(&self, ctx: &ExecutionContext, parent_ids: &[Value]) -> Result<()> {
        for field in self.entity.relation_fields() {
            let Some(relation) = &field.relation else {
                continue;
            };

            if !relation.delete_with_parent || relation.owned_by_table {
                continue;
            }

            let Some(child_key_column) = &relation.child_key_column else {
                continue;
            };

            let child = ctx.registry.get(&relation.target_entity)?;
            let Some(child_key) = child.field_by_column(child_key_column) else {
                return Err(Error::configuration(format!(
                    "relation `{}` of entity `{}` references unknown column `{child_key_column}` \
                     of entity `{}`",
                    field.name,
                    self.entity.name(),
                    child.name()
                )));
            };

            let mut query = DeleteQuery::new(child.table_name());
            query.conditions.push(
                JoinOperator::And,
                Condition::new(
                    child_key.name.clone(),
                    Operator::In,
                    Value::List(parent_ids.to_vec()),
                ),
            );

            let removed = ctx.data_store.delete(&query, &child)?;
            tracing::debug!(
                parent = self.entity.name(),
                child = child.name(),
                removed,
                "deleted dependent child rows"
            );
        }

        Ok(())
    }

    fn delete_extension_rows(
        &self,
        ctx: &ExecutionContext,
        ext: &ExtendedTableDetails,
        parent_ids: &[Value],
    ) -> Result<()> {
        let mut query = DeleteQuery::new(&ext.table_name);
        query.conditions.push(
            JoinOperator::And,
            Condition::new(
                ExtendedTableDetails::ENTITY_ID_COLUMN,
                Operator::In,
                Value::List(parent_ids.to_vec()),
            ),
        );

        ctx.data_store.delete(&query, &self.entity)?;
        Ok(())
    }
}

impl Executor for DeleteExecutor {
    fn execute(&self, ctx: &ExecutionContext, call: &MethodCall<'_>) -> Result<Value> {
        let entity = &self.entity;
        let conditions = condition::bind(&self.conditions, entity, &ctx.conversion, call)?;

        let has_dependent_children = entity.relation_fields().any(|field| {
            field
                .relation
                .as_ref()
                .is_some_and(|relation| relation.delete_with_parent && !relation.owned_by_table)
        });
        let fire_pre = ctx
            .listeners
            .is_listener_present(entity.name(), EntityEventType::PreDelete);
        let fire_post = ctx
            .listeners
            .is_listener_present(entity.name(), EntityEventType::PostDelete);

        // ids are only fetched when something downstream needs them
        let parent_ids = if has_dependent_children
            || entity.is_extendable()
            || fire_pre
            || fire_post
        {
            Some(self.matching_ids(ctx, &conditions)?)
        } else {
            None
        };

        if fire_pre {
            let data = Value::List(parent_ids.clone().unwrap_or_default());
            ctx.listeners
                .handle_event_type(entity.name(), EntityEventType::PreDelete, &data);
        }

        if let Some(ids) = parent_ids.as_deref().filter(|ids| !ids.is_empty()) {
            if has_dependent_children {
                self.delete_children(ctx, ids)?;
            }

            if let Some(ext) = entity.extended_table() {
                self.delete_extension_rows(ctx, ext, ids)?;
            }
        }

        let mut query = DeleteQuery::new(entity.table_name());
        query.conditions = conditions;
        let deleted = ctx.data_store.delete(&query, entity)?;

        if fire_post {
            let data = Value::List(parent_ids.unwrap_or_default());
            ctx.listeners
                .handle_event_type(entity.name(), EntityEventType::PostDelete, &data);
        }

        Ok(match self.result {
            ResultShape::Unit => Value::Null,
            ResultShape::Bool => Value::Bool(deleted > 0),
            _ => Value::I64(deleted as i64),
        })
    }
}
