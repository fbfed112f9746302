use crate::executor::{ExecutionContext, Executor, ExecutorFactory, ExecutorKind, MethodCall, SearchQuery};
use indexmap::IndexMap;
use stratum_core::schema::EntityDetails;
use stratum_core::stmt::{JoinOperator, NullCheck, Operator, OrderByType, UpdateOperator, Value};
use stratum_core::{Error, Result};
use std::sync::Arc;

/// Shape of the value a repository method yields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultShape {
    /// Nothing; the operation's effect is the result.
    Unit,

    /// Existence / success flag.
    Bool,

    /// Affected-row or matched-row count.
    Count,

    /// A single projected column of a single row.
    Scalar,

    /// Exactly one record; empty and multi-row results are errors.
    One,

    /// At most one record; empty yields `Null`.
    OptionalOne,

    /// All matching records as a list.
    #[default]
    Many,
}

/// Where a condition's operand comes from at execution time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ConditionSource {
    /// Positional method parameter.
    Param(usize),

    /// A value fixed in the declaration.
    Inline(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ConditionDeclKind {
    Compare {
        path: String,
        op: Operator,
        source: ConditionSource,
        null_check: NullCheck,
        ignore_case: bool,
    },
    Group(Vec<ConditionDecl>),
}

/// One declared predicate of a repository method, bound to parameter values
/// at execution time. Declarations form an ordered tree; nested groups
/// express OR-of-ANDs.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionDecl {
    pub(crate) join: JoinOperator,
    pub(crate) kind: ConditionDeclKind,
}

impl ConditionDecl {
    /// `path <op> params[index]`, AND-joined.
    pub fn param(path: impl Into<String>, op: Operator, index: usize) -> Self {
        Self {
            join: JoinOperator::And,
            kind: ConditionDeclKind::Compare {
                path: path.into(),
                op,
                source: ConditionSource::Param(index),
                null_check: NullCheck::default(),
                ignore_case: false,
            },
        }
    }

    /// `path <op> value` with a fixed operand, AND-joined.
    pub fn value(path: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            join: JoinOperator::And,
            kind: ConditionDeclKind::Compare {
                path: path.into(),
                op,
                source: ConditionSource::Inline(value.into()),
                null_check: NullCheck::default(),
                ignore_case: false,
            },
        }
    }

    /// A nested group, AND-joined to the node before it.
    pub fn group(nodes: Vec<ConditionDecl>) -> Self {
        Self {
            join: JoinOperator::And,
            kind: ConditionDeclKind::Group(nodes),
        }
    }

    /// Joins this node to the previous one with OR instead of AND.
    pub fn or(mut self) -> Self {
        self.join = JoinOperator::Or;
        self
    }

    /// Policy when the bound operand is `Null`. The default skips the
    /// predicate.
    pub fn null_check(mut self, null_check: NullCheck) -> Self {
        if let ConditionDeclKind::Compare {
            null_check: slot, ..
        } = &mut self.kind
        {
            *slot = null_check;
        }
        self
    }

    /// Requests case-insensitive comparison.
    pub fn ignore_case(mut self) -> Self {
        if let ConditionDeclKind::Compare { ignore_case, .. } = &mut self.kind {
            *ignore_case = true;
        }
        self
    }
}

/// One declared update assignment: `field = current <op> params[index]`, or a
/// plain overwrite when the operator is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentDecl {
    pub(crate) field: String,
    pub(crate) param: usize,
    pub(crate) op: UpdateOperator,
}

impl AssignmentDecl {
    pub fn set(field: impl Into<String>, param: usize) -> Self {
        Self {
            field: field.into(),
            param,
            op: UpdateOperator::None,
        }
    }

    pub fn apply(field: impl Into<String>, op: UpdateOperator, param: usize) -> Self {
        Self {
            field: field.into(),
            param,
            op,
        }
    }
}

/// Declarative description of one repository method. The dispatch layer
/// resolves each descriptor to an executor exactly once, at repository
/// construction.
#[derive(Debug, Clone, Default)]
pub struct MethodDescriptor {
    pub(crate) name: String,
    pub(crate) kind: Option<ExecutorKind>,
    pub(crate) conditions: Vec<ConditionDecl>,
    pub(crate) order_by: Vec<(String, OrderByType)>,
    pub(crate) result: ResultShape,
    pub(crate) projection: Vec<String>,
    pub(crate) assignments: Vec<AssignmentDecl>,
    pub(crate) entity_param: Option<usize>,
    pub(crate) auto_fetch_id: bool,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tags the method with an explicit executor kind, bypassing name-prefix
    /// matching.
    pub fn kind(mut self, kind: ExecutorKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn condition(mut self, condition: ConditionDecl) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, order: OrderByType) -> Self {
        self.order_by.push((field.into(), order));
        self
    }

    pub fn result(mut self, result: ResultShape) -> Self {
        self.result = result;
        self
    }

    /// Restricts the fetched fields. Without a projection, finders fetch
    /// every table-backed field.
    pub fn project(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.projection = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn assignment(mut self, assignment: AssignmentDecl) -> Self {
        self.assignments.push(assignment);
        self
    }

    /// Marks the parameter carrying the full entity record (saves and
    /// reconciling updates). Saves default to parameter 0.
    pub fn entity_param(mut self, index: usize) -> Self {
        self.entity_param = Some(index);
        self
    }

    /// Requests the generated identity be fetched back into the saved record.
    pub fn auto_fetch_id(mut self) -> Self {
        self.auto_fetch_id = true;
        self
    }
}

/// A constructed repository: each declared method resolved to its executor,
/// bound to one entity and one execution context.
pub struct Repository {
    name: String,
    entity: Arc<EntityDetails>,
    context: Arc<ExecutionContext>,
    methods: IndexMap<String, Box<dyn Executor>>,
}

impl Repository {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entity(&self) -> &EntityDetails {
        &self.entity
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Invokes a declared method with positional parameter values.
    pub fn execute(&self, method: &str, params: &[Value]) -> Result<Value> {
        self.executor(method)?
            .execute(&self.context, &MethodCall::with_params(params))
    }

    /// Invokes a declared search method with a runtime query.
    pub fn search(&self, method: &str, query: &SearchQuery) -> Result<Value> {
        self.executor(method)?
            .execute(&self.context, &MethodCall::with_search(query))
    }

    fn executor(&self, method: &str) -> Result<&dyn Executor> {
        self.methods
            .get(method)
            .map(|executor| &**executor)
            .ok_or_else(|| {
                Error::repository(format!(
                    "repository `{}` declares no method `{method}`",
                    self.name
                ))
            })
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("name", &self.name)
            .field("entity", &self.entity.name())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Collects method declarations for one repository and resolves them against
/// an executor factory.
pub struct RepositoryBuilder {
    name: String,
    entity: String,
    methods: Vec<MethodDescriptor>,
}

impl RepositoryBuilder {
    pub fn new(name: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity: entity.into(),
            methods: vec![],
        }
    }

    pub fn method(mut self, descriptor: MethodDescriptor) -> Self {
        self.methods.push(descriptor);
        self
    }

    /// Resolves every declared method. A method no executor matches, or a
    /// duplicate method name, fails the whole repository.
    pub fn build(
        self,
        factory: &ExecutorFactory,
        context: Arc<ExecutionContext>,
    ) -> Result<Repository> {
        let entity = context.registry.get(&self.entity)?;
        let mut methods: IndexMap<String, Box<dyn Executor>> = IndexMap::new();

        for descriptor in self.methods {
            if methods.contains_key(&descriptor.name) {
                return Err(Error::repository(format!(
                    "repository `{}` declares method `{}` more than once",
                    self.name, descriptor.name
                )));
            }

            let Some(executor) = factory.resolve(&self.name, &descriptor, entity.clone())? else {
                return Err(Error::repository(format!(
                    "no executor matched method `{}` of repository `{}`",
                    descriptor.name, self.name
                )));
            };

            tracing::debug!(
                repository = self.name,
                method = descriptor.name,
                "resolved repository method"
            );
            methods.insert(descriptor.name, executor);
        }

        Ok(Repository {
            name: self.name,
            entity,
            context,
            methods,
        })
    }
}
