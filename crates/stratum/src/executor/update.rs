use super::{condition, persist, ExecutionContext, Executor, MethodCall};
use crate::listener::EntityEventType;
use crate::relation::RelationDiff;
use crate::repository::{AssignmentDecl, ConditionDecl, MethodDescriptor, ResultShape};
use stratum_core::schema::{
    EntityDetails, FieldDetails, RelationUpdateType,
};
use stratum_core::stmt::{
    Assignment, Condition, DeleteQuery, InsertQuery, JoinOperator, Operator, Record,
    UpdateOperator, UpdateQuery, Value,
};
use stratum_core::{Error, Result};
use std::sync::Arc;

/// Applies declared assignments (or a full entity record) to matching rows,
/// incrementing the version field and reconciling collection relations.
pub(super) struct UpdateExecutor {
    entity: Arc<EntityDetails>,
    conditions: Vec<ConditionDecl>,
    assignments: Vec<AssignmentDecl>,
    entity_param: Option<usize>,
    result: ResultShape,
}

pub(super) fn construct(
    repository: &str,
    descriptor: &MethodDescriptor,
    entity: Arc<EntityDetails>,
) -> Result<Box<dyn Executor>> {
    condition::validate(&descriptor.conditions, &entity, repository, &descriptor.name)?;

    for assignment in &descriptor.assignments {
        let Some(field) = entity.field(&assignment.field) else {
            return Err(Error::repository(format!(
                "method `{}` of repository `{repository}` assigns unknown field `{}` of \
                 entity `{}`",
                descriptor.name,
                assignment.field,
                entity.name()
            )));
        };

        if !field.updateable || field.is_relation_field() {
            return Err(Error::repository(format!(
                "method `{}` of repository `{repository}` assigns non-updateable field `{}` \
                 of entity `{}`",
                descriptor.name,
                assignment.field,
                entity.name()
            )));
        }
    }

    if descriptor.assignments.is_empty() && descriptor.entity_param.is_none() {
        return Err(Error::repository(format!(
            "update method `{}` of repository `{repository}` declares neither assignments \
             nor an entity parameter",
            descriptor.name
        )));
    }

    Ok(Box::new(UpdateExecutor {
        entity,
        conditions: descriptor.conditions.clone(),
        assignments: descriptor.assignments.clone(),
        entity_param: descriptor.entity_param,
        result: descriptor.result,
    }))
}

/// Appends the implicit version increment unless the caller assigned the
/// version field explicitly.
fn push_version_increment(entity: &EntityDetails, assignments: &mut Vec<Assignment>) {
    let Some(version) = entity.version_field() else {
        return;
    };

    if assignments
        .iter()
        .any(|assignment| assignment.column == version.column)
    {
        return;
    }

    assignments.push(Assignment::apply(
        version.column.clone(),
        UpdateOperator::Add,
        Value::I32(1),
    ));
}

impl UpdateExecutor {
    /// Partial update: each declared assignment binds one parameter,
    /// rendered as `column = column <op> value` for arithmetic operators.
    fn bind_assignments(
        &self,
        ctx: &ExecutionContext,
        call: &MethodCall<'_>,
    ) -> Result<(Vec<Assignment>, Record)> {
        let mut assignments = Vec::with_capacity(self.assignments.len() + 1);
        let mut assigned = Record::new();

        for decl in &self.assignments {
            // fields were validated at construction
            let Some(field) = self.entity.field(&decl.field) else {
                continue;
            };

            let value = call.param(decl.param)?.clone();
            let stored = ctx.conversion.to_storage(&value, field)?;

            assigned.insert(decl.field.clone(), value);
            assignments.push(Assignment {
                column: field.column.clone(),
                op: decl.op,
                value: stored,
            });
        }

        push_version_increment(&self.entity, &mut assignments);
        Ok((assignments, assigned))
    }

    /// Full-entity update: every updateable table field is overwritten from
    /// the record.
    fn record_assignments(
        &self,
        ctx: &ExecutionContext,
        record: &Record,
    ) -> Result<Vec<Assignment>> {
        let mut assignments = Vec::new();

        for (path, field) in persist::table_fields(&self.entity) {
            if !field.updateable || field.version_field {
                continue;
            }

            let value = record.entry(&path).cloned().unwrap_or(Value::Null);
            let value = if field.is_relation_field() {
                persist::relation_key(ctx, field, &value)?
            } else {
                value
            };

            let stored = ctx.conversion.to_storage(&value, field)?;
            assignments.push(Assignment::set(field.column.clone(), stored));
        }

        push_version_increment(&self.entity, &mut assignments);
        Ok(assignments)
    }

    fn id_of(&self, record: &Record) -> Result<Value> {
        let id_field = self.entity.id_field();
        match record.get(&id_field.name) {
            Some(id) if !id.is_null() => Ok(id.clone()),
            _ => Err(Error::repository(format!(
                "entity update of `{}` requires the record to carry its identity field `{}`",
                self.entity.name(),
                id_field.name
            ))),
        }
    }

    /// Reconciles collection relations of a full-entity update per their
    /// declared policy.
    fn reconcile_relations(
        &self,
        ctx: &ExecutionContext,
        record: &Record,
        parent_id: &Value,
    ) -> Result<()> {
        for field in self.entity.relation_fields() {
            let Some(relation) = &field.relation else {
                continue;
            };

            if relation.owned_by_table || relation.update_type == RelationUpdateType::None {
                continue;
            }

            let Some(Value::List(incoming)) = record.get(&field.name) else {
                // relation absent from the record: leave it untouched
                continue;
            };

            let incoming: Vec<Record> = incoming
                .iter()
                .map(|child| child.as_record().cloned().unwrap_or_default())
                .collect();

            let child = ctx.registry.get(&relation.target_entity)?;
            let Some(column) = &relation.child_key_column else {
                continue;
            };
            let Some(child_key) = child.field_by_column(column).cloned() else {
                return Err(Error::configuration(format!(
                    "relation `{}` of entity `{}` references unknown column `{column}` of \
                     entity `{}`",
                    field.name,
                    self.entity.name(),
                    child.name()
                )));
            };

            let persisted = persisted_child_ids(ctx, &child, &child_key, parent_id)?;
            let diff =
                RelationDiff::compute(&persisted, &incoming, &child.id_field().name);

            tracing::debug!(
                parent = self.entity.name(),
                relation = field.name,
                added = diff.added.len(),
                removed = diff.removed.len(),
                retained = diff.retained.len(),
                "reconciling relation"
            );

            for added in &diff.added {
                let mut added = added.clone();
                added.insert(child_key.name.clone(), parent_id.clone());

                let mut query = InsertQuery::new(child.table_name());
                query.columns = persist::record_columns(ctx, &child, &added)?;
                ctx.data_store.insert(&query, &child)?;
            }

            if !diff.removed.is_empty() {
                sever_children(ctx, &child, &child_key, diff.removed, relation.update_type)?;
            }

            if relation.update_type == RelationUpdateType::Cascade {
                for retained in &diff.retained {
                    update_child(ctx, &child, retained)?;
                }
            }
        }

        Ok(())
    }
}

fn persisted_child_ids(
    ctx: &ExecutionContext,
    child: &EntityDetails,
    child_key: &FieldDetails,
    parent_id: &Value,
) -> Result<Vec<Value>> {
    let id_field = child.id_field();

    let mut query = stratum_core::stmt::SelectQuery::new(child.table_name());
    query.columns = vec![stratum_core::stmt::ResultField::new(
        &id_field.name,
        &id_field.column,
    )];
    query.conditions.push(
        JoinOperator::And,
        Condition::new(child_key.name.clone(), Operator::Eq, parent_id.clone()),
    );

    let rows = ctx.data_store.execute_query(&query, child)?;

    // normalize driver values so they diff against incoming record ids
    rows.iter()
        .map(|row| {
            let stored = row.get(&id_field.column).cloned().unwrap_or(Value::Null);
            ctx.conversion.to_rust(&stored, id_field)
        })
        .collect()
}

/// Detaches removed children: sync nulls the foreign key when it is
/// nullable (and deletes otherwise), cascade deletes outright.
fn sever_children(
    ctx: &ExecutionContext,
    child: &EntityDetails,
    child_key: &FieldDetails,
    removed: Vec<Value>,
    update_type: RelationUpdateType,
) -> Result<()> {
    let id_field = child.id_field();
    let sever_by_nulling =
        update_type == RelationUpdateType::SyncRelation && child_key.nullable;

    if sever_by_nulling {
        let mut query = UpdateQuery::new(child.table_name());
        query.assignments = vec![Assignment::set(child_key.column.clone(), Value::Null)];
        query.conditions.push(
            JoinOperator::And,
            Condition::new(id_field.name.clone(), Operator::In, Value::List(removed)),
        );
        ctx.data_store.update(&query, child)?;
    } else {
        let mut query = DeleteQuery::new(child.table_name());
        query.conditions.push(
            JoinOperator::And,
            Condition::new(id_field.name.clone(), Operator::In, Value::List(removed)),
        );
        ctx.data_store.delete(&query, child)?;
    }

    Ok(())
}

/// Cascade: overwrite a retained child row from its incoming record.
fn update_child(ctx: &ExecutionContext, child: &EntityDetails, record: &Record) -> Result<()> {
    let id_field = child.id_field();
    let Some(id) = record.get(&id_field.name).cloned() else {
        return Ok(());
    };

    let mut assignments = Vec::new();
    for (path, field) in persist::table_fields(child) {
        if !field.updateable || field.version_field {
            continue;
        }

        let value = record.entry(&path).cloned().unwrap_or(Value::Null);
        let value = if field.is_relation_field() {
            persist::relation_key(ctx, field, &value)?
        } else {
            value
        };
        let stored = ctx.conversion.to_storage(&value, field)?;
        assignments.push(Assignment::set(field.column.clone(), stored));
    }
    push_version_increment(child, &mut assignments);

    let mut query = UpdateQuery::new(child.table_name());
    query.assignments = assignments;
    query.conditions.push(
        JoinOperator::And,
        Condition::new(id_field.name.clone(), Operator::Eq, id),
    );

    ctx.data_store.update(&query, child)?;
    Ok(())
}

impl Executor for UpdateExecutor {
    fn execute(&self, ctx: &ExecutionContext, call: &MethodCall<'_>) -> Result<Value> {
        let entity = &self.entity;
        let mut conditions = condition::bind(&self.conditions, entity, &ctx.conversion, call)?;

        let (assignments, event_data, reconcile) = match self.entity_param {
            Some(index) => {
                let record = persist::record_param(call.param(index)?)?;
                let id = self.id_of(record)?;

                persist::check_unique_constraints(ctx, entity, record, Some(&id))?;
                persist::check_foreign_constraints(ctx, entity, record)?;

                // a full-entity update targets the record's own row unless
                // the method declared conditions
                if conditions.is_empty() {
                    conditions.push(
                        JoinOperator::And,
                        Condition::new(
                            entity.id_field().name.clone(),
                            Operator::Eq,
                            id.clone(),
                        ),
                    );
                }

                let assignments = self.record_assignments(ctx, record)?;
                (assignments, record.clone(), Some((record.clone(), id)))
            }
            None => {
                let (assignments, assigned) = self.bind_assignments(ctx, call)?;
                (assignments, assigned, None)
            }
        };

        let event_data = Value::Record(event_data);

        if ctx
            .listeners
            .is_listener_present(entity.name(), EntityEventType::PreUpdate)
        {
            ctx.listeners
                .handle_event_type(entity.name(), EntityEventType::PreUpdate, &event_data);
        }

        let mut query = UpdateQuery::new(entity.table_name());
        query.assignments = assignments;
        query.conditions = conditions;

        let updated = ctx.data_store.update(&query, entity)?;

        if let Some((record, id)) = reconcile {
            self.reconcile_relations(ctx, &record, &id)?;
        }

        if ctx
            .listeners
            .is_listener_present(entity.name(), EntityEventType::PostUpdate)
        {
            ctx.listeners
                .handle_event_type(entity.name(), EntityEventType::PostUpdate, &event_data);
        }

        Ok(match self.result {
            ResultShape::Unit => Value::Null,
            ResultShape::Bool => Value::Bool(updated > 0),
            _ => Value::I64(updated as i64),
        })
    }
}
