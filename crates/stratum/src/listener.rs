use stratum_core::stmt::Value;
use stratum_core::Result;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Lifecycle phases executors fire around persistence operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityEventType {
    PreSave,
    PostSave,
    PreUpdate,
    PostUpdate,
    PreDelete,
    PostDelete,
}

impl EntityEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreSave => "PRE_SAVE",
            Self::PostSave => "POST_SAVE",
            Self::PreUpdate => "PRE_UPDATE",
            Self::PostUpdate => "POST_UPDATE",
            Self::PreDelete => "PRE_DELETE",
            Self::PostDelete => "POST_DELETE",
        }
    }
}

impl std::fmt::Display for EntityEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The event handed to listeners: which entity, which phase, and the data the
/// triggering operation carried (a record for saves/updates, ids for
/// deletes).
#[derive(Debug)]
pub struct EntityEvent<'a> {
    pub entity: &'a str,
    pub event_type: EntityEventType,
    pub data: &'a Value,
}

type ListenerFn = Arc<dyn Fn(&EntityEvent<'_>) -> Result<()> + Send + Sync>;

/// A listener registration: the callback, the phase it subscribes to, and an
/// optional entity filter. Without a filter the listener is global and fires
/// for every entity.
pub struct ListenerRegistration {
    entity: Option<String>,
    event_type: EntityEventType,
    callback: ListenerFn,
}

impl ListenerRegistration {
    pub fn new<F>(event_type: EntityEventType, callback: F) -> Self
    where
        F: Fn(&EntityEvent<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            entity: None,
            event_type,
            callback: Arc::new(callback),
        }
    }

    /// Restricts the listener to events of one entity.
    pub fn for_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

/// Dispatches lifecycle events to registered listeners.
///
/// Listeners are keyed `"<Entity>@<EventType>"` when entity-scoped and
/// `"<EventType>"` when global. On dispatch, entity-scoped listeners run
/// before global ones, each set in registration order. A listener failure is
/// logged and suppressed; it never aborts the triggering operation or the
/// remaining listeners.
#[derive(Default)]
pub struct EntityListenerManager {
    listeners: RwLock<HashMap<String, Vec<ListenerFn>>>,
}

fn scoped_key(entity: &str, event_type: EntityEventType) -> String {
    format!("{entity}@{event_type}")
}

impl EntityListenerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_listener(&self, registration: ListenerRegistration) {
        let key = match &registration.entity {
            Some(entity) => scoped_key(entity, registration.event_type),
            None => registration.event_type.to_string(),
        };

        self.listeners
            .write()
            .unwrap()
            .entry(key)
            .or_default()
            .push(registration.callback);
    }

    /// True when at least one listener (scoped or global) subscribes to the
    /// event. Lets executors skip event construction entirely.
    pub fn is_listener_present(&self, entity: &str, event_type: EntityEventType) -> bool {
        let listeners = self.listeners.read().unwrap();
        listeners.contains_key(&scoped_key(entity, event_type))
            || listeners.contains_key(event_type.as_str())
    }

    /// Fires the event to entity-scoped then global listeners.
    pub fn handle_event_type(&self, entity: &str, event_type: EntityEventType, data: &Value) {
        let to_fire: Vec<ListenerFn> = {
            let listeners = self.listeners.read().unwrap();
            let scoped = listeners.get(&scoped_key(entity, event_type));
            let global = listeners.get(event_type.as_str());

            scoped
                .into_iter()
                .chain(global)
                .flatten()
                .cloned()
                .collect()
        };

        if to_fire.is_empty() {
            return;
        }

        let event = EntityEvent {
            entity,
            event_type,
            data,
        };

        for listener in to_fire {
            if let Err(err) = listener(&event) {
                tracing::warn!(
                    entity,
                    event = %event_type,
                    %err,
                    "entity listener failed; continuing"
                );
            }
        }
    }

    /// Purges listeners scoped to a removed entity. Global listeners stay.
    pub fn entity_removed(&self, entity: &str) {
        let prefix = format!("{entity}@");
        self.listeners
            .write()
            .unwrap()
            .retain(|key, _| !key.starts_with(&prefix));
    }
}

impl std::fmt::Debug for EntityListenerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.read().unwrap();
        f.debug_struct("EntityListenerManager")
            .field("keys", &listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}
