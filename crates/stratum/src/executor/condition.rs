use super::MethodCall;
use crate::repository::{ConditionDecl, ConditionDeclKind, ConditionSource};
use stratum_core::schema::{EntityDetails, FieldDetails};
use stratum_core::stmt::{
    Condition, ConditionGroup, NullCheck, Operator, Value,
};
use stratum_core::{ConversionService, Error, Result};

/// Checks every declared condition path against the entity metadata. Runs
/// once, at executor construction.
pub(super) fn validate(
    decls: &[ConditionDecl],
    entity: &EntityDetails,
    repository: &str,
    method: &str,
) -> Result<()> {
    for decl in decls {
        match &decl.kind {
            ConditionDeclKind::Compare { path, .. } => {
                if entity.resolve_path(path).is_none() {
                    return Err(Error::repository(format!(
                        "method `{method}` of repository `{repository}` references unknown \
                         field path `{path}` of entity `{}`",
                        entity.name()
                    )));
                }
            }
            ConditionDeclKind::Group(nodes) => validate(nodes, entity, repository, method)?,
        }
    }

    Ok(())
}

/// Binds declared conditions to invocation parameters, producing the
/// condition tree handed to the driver.
///
/// A `Null` operand is resolved through the declaration's null policy: skip
/// the predicate, or emit an explicit `IS [NOT] NULL` check.
pub(super) fn bind(
    decls: &[ConditionDecl],
    entity: &EntityDetails,
    conversion: &ConversionService,
    call: &MethodCall<'_>,
) -> Result<ConditionGroup> {
    let mut group = ConditionGroup::new();

    for decl in decls {
        match &decl.kind {
            ConditionDeclKind::Group(nodes) => {
                group.push_group(decl.join, bind(nodes, entity, conversion, call)?);
            }
            ConditionDeclKind::Compare {
                path,
                op,
                source,
                null_check,
                ignore_case,
            } => {
                let operand = match source {
                    ConditionSource::Param(index) => call.param(*index)?.clone(),
                    ConditionSource::Inline(value) => value.clone(),
                };

                // paths were validated at construction
                let Some(field) = entity.resolve_path(path) else {
                    return Err(Error::repository(format!(
                        "unknown field path `{path}` of entity `{}`",
                        entity.name()
                    )));
                };

                if operand.is_null() {
                    match null_check {
                        NullCheck::Skip => continue,
                        NullCheck::IsNull => {
                            group.push(decl.join, Condition::new(path, Operator::Eq, Value::Null));
                        }
                        NullCheck::IsNotNull => {
                            group.push(decl.join, Condition::new(path, Operator::Ne, Value::Null));
                        }
                    }
                    continue;
                }

                let operand = convert_operand(operand, *op, field, conversion)?;
                let mut condition = Condition::new(path, *op, operand);
                condition.ignore_case = *ignore_case;
                group.push(decl.join, condition);
            }
        }
    }

    Ok(group)
}

/// Converts a bound operand to the field's storage representation. `IN`
/// operands convert element-wise.
fn convert_operand(
    operand: Value,
    op: Operator,
    field: &FieldDetails,
    conversion: &ConversionService,
) -> Result<Value> {
    match (op, operand) {
        (Operator::In | Operator::NotIn, Value::List(items)) => {
            let items = items
                .iter()
                .map(|item| conversion.to_storage(item, field))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::List(items))
        }
        (_, operand) => conversion.to_storage(&operand, field),
    }
}
