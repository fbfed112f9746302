use super::EntityDetails;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

type CreateTableListener = Box<dyn FnOnce(&EntityDetails) + Send>;

struct PendingListener {
    waiting_on: HashSet<String>,
    listener: CreateTableListener,
}

#[derive(Default)]
struct State {
    /// Entities whose backing tables exist.
    ready: HashMap<String, Arc<EntityDetails>>,

    /// Listeners still waiting on one or more entities.
    pending: Vec<PendingListener>,
}

/// Tracks which entities have backing tables and lets dependents wait on
/// creation order.
///
/// Table creation can be triggered concurrently by multiple repository
/// initializations, so registration and readiness notification are strictly
/// ordered through a single lock per monitor. A listener fires at most once,
/// never before every entity it waits on is ready, and is discarded after
/// firing.
#[derive(Default)]
pub struct EntityDetailsMonitor {
    state: Mutex<State>,
}

impl EntityDetailsMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entity whose table already existed when it was loaded.
    /// Unblocks table creation for entities that depend on it.
    pub fn add_entity_with_table(&self, details: Arc<EntityDetails>) {
        tracing::debug!(entity = details.name(), "found entity with existing table");
        self.mark_ready(details);
    }

    /// Event method invoked after an entity's tables are created.
    pub fn tables_created_for_entity(&self, details: Arc<EntityDetails>) {
        tracing::debug!(entity = details.name(), "tables created for entity");
        self.mark_ready(details);
    }

    fn mark_ready(&self, details: Arc<EntityDetails>) {
        let fire = {
            let mut state = self.state.lock().unwrap();
            let name = details.name().to_string();
            state.ready.insert(name.clone(), details.clone());

            // split out listeners whose last awaited entity just became ready
            let pending = std::mem::take(&mut state.pending);
            let mut fire = Vec::new();

            for mut entry in pending {
                entry.waiting_on.remove(&name);

                if entry.waiting_on.is_empty() {
                    fire.push(entry.listener);
                } else {
                    state.pending.push(entry);
                }
            }

            fire
        };

        for listener in fire {
            listener(&details);
        }
    }

    /// Pure membership query: true when every named entity is ready.
    pub fn is_tables_created(&self, entities: &[&str]) -> bool {
        let state = self.state.lock().unwrap();
        entities.iter().all(|name| state.ready.contains_key(*name))
    }

    /// Registers interest in the named entities. If all are already ready
    /// the listener fires synchronously and is not stored; otherwise it is
    /// queued and fires exactly once, when the last of them becomes ready.
    pub fn add_create_table_listener<F>(&self, listener: F, entities: &[&str])
    where
        F: FnOnce(&EntityDetails) + Send + 'static,
    {
        let immediate = {
            let mut state = self.state.lock().unwrap();

            let waiting_on: HashSet<String> = entities
                .iter()
                .filter(|name| !state.ready.contains_key(**name))
                .map(|name| name.to_string())
                .collect();

            if waiting_on.is_empty() {
                entities
                    .last()
                    .and_then(|name| state.ready.get(*name).cloned())
            } else {
                state.pending.push(PendingListener {
                    waiting_on,
                    listener: Box::new(listener),
                });
                return;
            }
        };

        if let Some(details) = immediate {
            listener(&details);
        }
    }

    /// Called when an entity is unregistered: forgets its readiness and
    /// drops listeners still waiting on it.
    pub fn entity_removed(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        state.ready.remove(name);
        state
            .pending
            .retain(|entry| !entry.waiting_on.contains(name));
    }
}

impl std::fmt::Debug for EntityDetailsMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("EntityDetailsMonitor")
            .field("ready", &state.ready.keys().collect::<Vec<_>>())
            .field("pending", &state.pending.len())
            .finish()
    }
}
