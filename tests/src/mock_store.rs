use stratum_core::driver::{Capability, DataStore, Row, WriteResult};
use stratum_core::schema::EntityDetails;
use stratum_core::stmt::{
    AggregateQuery, DeleteQuery, InsertQuery, SelectQuery, UpdateQuery, Value,
};
use stratum_core::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

/// One query issued through the mock store, exactly as the engine compiled
/// it.
#[derive(Debug, Clone, PartialEq)]
pub enum Issued {
    CreateTable(String),
    Select(SelectQuery),
    Aggregate(AggregateQuery),
    Insert(InsertQuery),
    Update(UpdateQuery),
    Delete(DeleteQuery),
}

/// A driver that executes nothing: it logs every compiled query for
/// assertion and answers from caller-queued responses.
///
/// Select responses are consumed front-to-back; an empty queue answers with
/// no rows. Aggregates default to zero. Inserts report one affected row and
/// hand out sequential generated keys when asked.
#[derive(Debug)]
pub struct MockStore {
    capability: Capability,
    issued: Mutex<Vec<Issued>>,
    rows: Mutex<VecDeque<Vec<Row>>>,
    aggregates: Mutex<VecDeque<Value>>,
    affected: Mutex<VecDeque<u64>>,
    next_key: AtomicI64,
}

impl Default for MockStore {
    fn default() -> Self {
        Self {
            capability: Capability::default(),
            issued: Mutex::new(Vec::new()),
            rows: Mutex::new(VecDeque::new()),
            aggregates: Mutex::new(VecDeque::new()),
            affected: Mutex::new(VecDeque::new()),
            next_key: AtomicI64::new(1),
        }
    }
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capability(capability: Capability) -> Self {
        Self {
            capability,
            ..Self::default()
        }
    }

    /// Queues the response of the next select.
    pub fn queue_rows(&self, rows: Vec<Row>) {
        self.rows.lock().unwrap().push_back(rows);
    }

    /// Queues the response of the next aggregate.
    pub fn queue_aggregate(&self, value: Value) {
        self.aggregates.lock().unwrap().push_back(value);
    }

    /// Queues the affected-row count of the next update or delete.
    pub fn queue_affected(&self, affected: u64) {
        self.affected.lock().unwrap().push_back(affected);
    }

    /// Snapshot of every issued query, in order.
    pub fn issued(&self) -> Vec<Issued> {
        self.issued.lock().unwrap().clone()
    }

    /// Drains the log, for tests asserting in phases.
    pub fn take_issued(&self) -> Vec<Issued> {
        std::mem::take(&mut self.issued.lock().unwrap())
    }

    /// Escape hatch for custom assertions over the log.
    pub fn with_issued<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Issued]) -> R,
    {
        let issued = self.issued.lock().unwrap();
        f(&issued)
    }

    fn log(&self, issued: Issued) {
        self.issued.lock().unwrap().push(issued);
    }

    fn next_affected(&self) -> u64 {
        self.affected.lock().unwrap().pop_front().unwrap_or(1)
    }
}

impl DataStore for MockStore {
    fn capability(&self) -> &Capability {
        &self.capability
    }

    fn create_table(&self, entity: &EntityDetails) -> Result<()> {
        self.log(Issued::CreateTable(entity.table_name().to_string()));
        Ok(())
    }

    fn execute_query(&self, query: &SelectQuery, _entity: &EntityDetails) -> Result<Vec<Row>> {
        self.log(Issued::Select(query.clone()));
        Ok(self.rows.lock().unwrap().pop_front().unwrap_or_default())
    }

    fn aggregate(&self, query: &AggregateQuery, _entity: &EntityDetails) -> Result<Value> {
        self.log(Issued::Aggregate(query.clone()));
        Ok(self
            .aggregates
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Value::I64(0)))
    }

    fn insert(&self, query: &InsertQuery, _entity: &EntityDetails) -> Result<WriteResult> {
        let generated_key = query
            .fetch_generated_id
            .then(|| Value::I64(self.next_key.fetch_add(1, Ordering::SeqCst)));

        self.log(Issued::Insert(query.clone()));
        Ok(WriteResult {
            affected: 1,
            generated_key,
        })
    }

    fn update(&self, query: &UpdateQuery, _entity: &EntityDetails) -> Result<u64> {
        self.log(Issued::Update(query.clone()));
        Ok(self.next_affected())
    }

    fn delete(&self, query: &DeleteQuery, _entity: &EntityDetails) -> Result<u64> {
        self.log(Issued::Delete(query.clone()));
        Ok(self.next_affected())
    }
}
