mod bootstrap;
pub use bootstrap::{PersistenceContext, PersistenceContextBuilder};

pub mod executor;
pub use executor::{
    ExecutionContext, Executor, ExecutorFactory, ExecutorKind, MethodCall, SearchCondition,
    SearchQuery,
};

mod listener;
pub use listener::{
    EntityEvent, EntityEventType, EntityListenerManager, ListenerRegistration,
};

mod relation;
pub use relation::RelationDiff;

pub mod repository;
pub use repository::{
    AssignmentDecl, ConditionDecl, MethodDescriptor, Repository, RepositoryBuilder, ResultShape,
};

pub use stratum_core::{
    driver, schema, stmt, ConversionService, DataStore, EntityDetails, Error, Result,
};
