use crate::executor::{ExecutionContext, ExecutorFactory};
use crate::listener::{EntityListenerManager, ListenerRegistration};
use crate::repository::{Repository, RepositoryBuilder};
use stratum_core::schema::{EntityBuilder, EntityDetailsMonitor, EntityRegistry};
use stratum_core::{ConversionService, DataStore, Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Wires the engine together: registries, conversion, listeners, the
/// executor factory and the storage driver.
pub struct PersistenceContextBuilder {
    data_store: Arc<dyn DataStore>,
    conversion: ConversionService,
    entities: Vec<EntityBuilder>,
    listeners: Vec<ListenerRegistration>,
    factory: ExecutorFactory,
}

impl PersistenceContextBuilder {
    pub fn entity(mut self, builder: EntityBuilder) -> Self {
        self.entities.push(builder);
        self
    }

    pub fn listener(mut self, registration: ListenerRegistration) -> Self {
        self.listeners.push(registration);
        self
    }

    pub fn conversion(mut self, conversion: ConversionService) -> Self {
        self.conversion = conversion;
        self
    }

    pub fn executor_factory(mut self, factory: ExecutorFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn build(self) -> Result<PersistenceContext> {
        let registry = Arc::new(EntityRegistry::new());
        for entity in self.entities {
            registry.register(entity)?;
        }

        let listeners = Arc::new(EntityListenerManager::new());
        for registration in self.listeners {
            listeners.register_listener(registration);
        }

        Ok(PersistenceContext {
            context: Arc::new(ExecutionContext {
                data_store: self.data_store,
                conversion: Arc::new(self.conversion),
                listeners,
                registry,
            }),
            factory: self.factory,
            monitor: Arc::new(EntityDetailsMonitor::new()),
        })
    }
}

/// The assembled engine. Repositories are constructed against it; table
/// creation and entity removal go through it so the monitor and the
/// registries stay consistent.
pub struct PersistenceContext {
    context: Arc<ExecutionContext>,
    factory: ExecutorFactory,
    monitor: Arc<EntityDetailsMonitor>,
}

impl PersistenceContext {
    pub fn builder(data_store: Arc<dyn DataStore>) -> PersistenceContextBuilder {
        PersistenceContextBuilder {
            data_store,
            conversion: ConversionService::new(),
            entities: vec![],
            listeners: vec![],
            factory: ExecutorFactory::new(),
        }
    }

    pub fn execution_context(&self) -> &Arc<ExecutionContext> {
        &self.context
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.context.registry
    }

    pub fn listeners(&self) -> &EntityListenerManager {
        &self.context.listeners
    }

    pub fn monitor(&self) -> &Arc<EntityDetailsMonitor> {
        &self.monitor
    }

    /// Builds a repository, resolving every declared method.
    pub fn repository(&self, builder: RepositoryBuilder) -> Result<Repository> {
        builder.build(&self.factory, self.context.clone())
    }

    /// Creates backing tables for every registered entity, parents before
    /// the entities that reference them. Each creation is reported to the
    /// monitor so create-table listeners fire in dependency order.
    pub fn create_tables(&self) -> Result<()> {
        let registry = &self.context.registry;

        let mut remaining: HashMap<String, HashSet<String>> = HashMap::new();
        for name in registry.entity_names() {
            let details = registry.get(&name)?;
            let deps: HashSet<String> = details
                .depends_on()
                .filter(|dep| *dep != name)
                .map(str::to_string)
                .collect();
            remaining.insert(name, deps);
        }

        for (name, deps) in &remaining {
            for dep in deps {
                if !remaining.contains_key(dep) {
                    return Err(Error::configuration(format!(
                        "entity `{name}` depends on unregistered entity `{dep}`"
                    )));
                }
            }
        }

        let mut created: HashSet<String> = HashSet::new();

        while !remaining.is_empty() {
            let mut ready: Vec<String> = remaining
                .iter()
                .filter(|(_, deps)| deps.iter().all(|dep| created.contains(dep)))
                .map(|(name, _)| name.clone())
                .collect();

            if ready.is_empty() {
                let mut stuck: Vec<_> = remaining.keys().cloned().collect();
                stuck.sort();
                return Err(Error::configuration(format!(
                    "entity dependency cycle involving: {}",
                    stuck.join(", ")
                )));
            }

            // deterministic creation order within a dependency rank
            ready.sort();

            for name in ready {
                let details = registry.get(&name)?;
                self.context.data_store.create_table(&details)?;
                tracing::info!(entity = name.as_str(), table = details.table_name(), "created table");

                self.monitor.tables_created_for_entity(details);
                remaining.remove(&name);
                created.insert(name);
            }
        }

        Ok(())
    }

    /// Unregisters an entity, purging its metadata, its scoped listeners and
    /// its monitor state in one step.
    pub fn entity_removed(&self, name: &str) {
        self.context.registry.entity_removed(name);
        self.context.listeners.entity_removed(name);
        self.monitor.entity_removed(name);
        tracing::debug!(entity = name, "entity removed");
    }
}

impl std::fmt::Debug for PersistenceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceContext")
            .field("registry", &self.context.registry)
            .finish()
    }
}
