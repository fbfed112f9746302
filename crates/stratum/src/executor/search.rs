use super::{condition, finder, persist, ExecutionContext, Executor, MethodCall};
use crate::repository::{ConditionDecl, MethodDescriptor, ResultShape};
use stratum_core::schema::{EntityDetails, FieldDetails};
use stratum_core::stmt::{NullCheck, Operator, OrderByType, SelectQuery, Value};
use stratum_core::Result;
use std::sync::Arc;

/// One dynamic predicate of a [`SearchQuery`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCondition {
    path: String,
    op: Operator,
    value: Value,
    or: bool,
    null_check: NullCheck,
    ignore_case: bool,
}

impl SearchCondition {
    pub fn new(path: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            op,
            value: value.into(),
            or: false,
            null_check: NullCheck::default(),
            ignore_case: false,
        }
    }

    pub fn or(mut self) -> Self {
        self.or = true;
        self
    }

    pub fn null_check(mut self, null_check: NullCheck) -> Self {
        self.null_check = null_check;
        self
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    fn into_decl(self) -> ConditionDecl {
        let mut decl = ConditionDecl::value(self.path, self.op, self.value)
            .null_check(self.null_check);
        if self.or {
            decl = decl.or();
        }
        if self.ignore_case {
            decl = decl.ignore_case();
        }
        decl
    }
}

/// A caller-assembled query: dynamic conditions, ordering and paging,
/// layered on top of a search method's declared conditions.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    conditions: Vec<SearchCondition>,
    order_by: Vec<(String, OrderByType)>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn condition(mut self, condition: SearchCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, order: OrderByType) -> Self {
        self.order_by.push((field.into(), order));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Like the finder, but layers runtime conditions, ordering and paging from
/// a [`SearchQuery`] over the method's declared shape. Declared conditions
/// (inline-valued) always apply; runtime conditions are appended after them.
pub(super) struct SearchExecutor {
    repository: String,
    method: String,
    label: String,
    entity: Arc<EntityDetails>,
    conditions: Vec<ConditionDecl>,
    fields: Vec<(String, FieldDetails)>,
    order_by: Vec<(String, OrderByType)>,
    result: ResultShape,
}

pub(super) fn construct(
    repository: &str,
    descriptor: &MethodDescriptor,
    entity: Arc<EntityDetails>,
) -> Result<Box<dyn Executor>> {
    condition::validate(&descriptor.conditions, &entity, repository, &descriptor.name)?;

    let fields = persist::result_fields(&entity, &descriptor.projection, repository, &descriptor.name)?;

    Ok(Box::new(SearchExecutor {
        repository: repository.to_string(),
        method: descriptor.name.clone(),
        label: format!("method `{}` of repository `{repository}`", descriptor.name),
        entity,
        conditions: descriptor.conditions.clone(),
        fields,
        order_by: descriptor.order_by.clone(),
        result: descriptor.result,
    }))
}

impl Executor for SearchExecutor {
    fn execute(&self, ctx: &ExecutionContext, call: &MethodCall<'_>) -> Result<Value> {
        let search = call.search_query()?;

        let mut decls = self.conditions.clone();
        decls.extend(search.conditions.iter().cloned().map(SearchCondition::into_decl));

        let conditions = condition::bind(&decls, &self.entity, &ctx.conversion, call)?;

        // runtime ordering overrides the declared one
        let order_by = if search.order_by.is_empty() {
            &self.order_by
        } else {
            &search.order_by
        };
        let order_by =
            finder::resolve_order_by(order_by, &self.entity, &self.repository, &self.method)?;

        let mut query = SelectQuery::new(self.entity.table_name());
        query.columns = persist::select_columns(&self.fields);
        query.conditions = conditions;
        query.order_by = order_by;
        query.limit = search.limit;
        query.offset = search.offset;

        let rows = ctx.data_store.execute_query(&query, &self.entity)?;
        finder::shape_rows(rows, &self.fields, &ctx.conversion, self.result, &self.label)
    }
}
