use super::{EntityBuilder, EntityDetails};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Process-wide entity metadata cache.
///
/// Declarations are registered up front (bootstrap); details are built on
/// first reference and memoized for the registry lifetime. The build lock is
/// coarse (one per registry, not per entry): builds are rare, and holding it
/// across the build guarantees at-most-once construction per entity.
#[derive(Default)]
pub struct EntityRegistry {
    declarations: Mutex<HashMap<String, EntityBuilder>>,
    built: Mutex<HashMap<String, Arc<EntityDetails>>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity declaration. Registering the same entity name
    /// twice is a configuration error.
    pub fn register(&self, builder: EntityBuilder) -> Result<()> {
        let mut declarations = self.declarations.lock().unwrap();
        let name = builder.name().to_string();

        if declarations.contains_key(&name) {
            return Err(Error::configuration(format!(
                "entity `{name}` is already registered"
            )));
        }

        declarations.insert(name, builder);
        Ok(())
    }

    /// Returns the memoized details for an entity, building them on first
    /// reference. Idempotent and thread-safe.
    pub fn get(&self, name: &str) -> Result<Arc<EntityDetails>> {
        let mut built = self.built.lock().unwrap();

        if let Some(details) = built.get(name) {
            return Ok(details.clone());
        }

        let builder = {
            let declarations = self.declarations.lock().unwrap();
            declarations.get(name).cloned()
        };

        let Some(builder) = builder else {
            return Err(Error::configuration(format!(
                "entity `{name}` is not registered"
            )));
        };

        let details = Arc::new(builder.build()?);
        built.insert(name.to_string(), details.clone());

        tracing::debug!(entity = name, "built entity details");
        Ok(details)
    }

    /// True when the entity's details have already been built.
    pub fn is_built(&self, name: &str) -> bool {
        self.built.lock().unwrap().contains_key(name)
    }

    pub fn entity_names(&self) -> Vec<String> {
        let declarations = self.declarations.lock().unwrap();
        declarations.keys().cloned().collect()
    }

    /// Unregisters an entity, purging its memoized details. Callers are
    /// responsible for purging dependent registrations (listeners, monitor
    /// state) alongside.
    pub fn entity_removed(&self, name: &str) {
        self.declarations.lock().unwrap().remove(name);
        self.built.lock().unwrap().remove(name);
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let built = self.built.lock().unwrap();
        f.debug_struct("EntityRegistry")
            .field("built", &built.keys().collect::<Vec<_>>())
            .finish()
    }
}
