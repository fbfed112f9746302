use crate::schema::EntityDetails;
use crate::stmt::{AggregateQuery, DeleteQuery, InsertQuery, Record, SelectQuery, UpdateQuery, Value};
use crate::Result;
use std::fmt::Debug;

/// One result row, keyed by column name.
pub type Row = Record;

/// Outcome of an insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteResult {
    pub affected: u64,

    /// Generated identity value, when the query requested it.
    pub generated_key: Option<Value>,
}

/// Describes what a store needs the engine to do on its behalf.
#[derive(Debug, Clone, Default)]
pub struct Capability {
    /// The store cannot enforce unique constraints itself; persist executors
    /// must query for clashes before writing.
    pub explicit_unique_check: bool,

    /// The store cannot enforce foreign keys itself; persist executors must
    /// verify parent rows before writing.
    pub explicit_foreign_check: bool,
}

/// The storage collaborator.
///
/// The engine compiles condition trees and field lists; rendering them into
/// dialect SQL and performing I/O is entirely the store's concern. All calls
/// block on the caller's thread; failures surface as synchronous errors that
/// the engine wraps and rethrows.
pub trait DataStore: Debug + Send + Sync + 'static {
    fn capability(&self) -> &Capability;

    /// Creates the backing table (and extension table, if any) for an
    /// entity.
    fn create_table(&self, entity: &EntityDetails) -> Result<()>;

    fn execute_query(&self, query: &SelectQuery, entity: &EntityDetails) -> Result<Vec<Row>>;

    fn aggregate(&self, query: &AggregateQuery, entity: &EntityDetails) -> Result<Value>;

    fn insert(&self, query: &InsertQuery, entity: &EntityDetails) -> Result<WriteResult>;

    fn update(&self, query: &UpdateQuery, entity: &EntityDetails) -> Result<u64>;

    fn delete(&self, query: &DeleteQuery, entity: &EntityDetails) -> Result<u64>;
}
