mod condition;
mod count;
mod delete;
mod factory;
mod finder;
mod persist;
mod save;
mod search;
mod update;

pub use factory::{ExecutorDetails, ExecutorFactory, ExecutorKind};
pub use search::{SearchCondition, SearchQuery};

use crate::listener::EntityListenerManager;
use stratum_core::schema::EntityRegistry;
use stratum_core::stmt::Value;
use stratum_core::{ConversionService, DataStore, Error, Result};
use std::sync::Arc;

/// Shared collaborators every executor runs against: the storage driver, the
/// conversion service, the listener manager and the entity registry.
#[derive(Debug)]
pub struct ExecutionContext {
    pub data_store: Arc<dyn DataStore>,
    pub conversion: Arc<ConversionService>,
    pub listeners: Arc<EntityListenerManager>,
    pub registry: Arc<EntityRegistry>,
}

/// Arguments of one method invocation: positional parameter values, plus the
/// runtime query for search methods.
pub struct MethodCall<'a> {
    params: &'a [Value],
    search: Option<&'a SearchQuery>,
}

impl<'a> MethodCall<'a> {
    pub fn with_params(params: &'a [Value]) -> Self {
        Self {
            params,
            search: None,
        }
    }

    pub fn with_search(query: &'a SearchQuery) -> Self {
        Self {
            params: &[],
            search: Some(query),
        }
    }

    pub(crate) fn param(&self, index: usize) -> Result<&Value> {
        self.params.get(index).ok_or_else(|| {
            Error::repository(format!(
                "method invoked with {} parameters, condition references parameter {index}",
                self.params.len()
            ))
        })
    }

    pub(crate) fn search_query(&self) -> Result<&SearchQuery> {
        self.search.ok_or_else(|| {
            Error::repository("search method invoked without a search query".to_string())
        })
    }
}

/// One resolved repository method, ready to run. Executors are immutable
/// after construction and shared freely across threads.
pub trait Executor: Send + Sync {
    fn execute(&self, ctx: &ExecutionContext, call: &MethodCall<'_>) -> Result<Value>;
}
