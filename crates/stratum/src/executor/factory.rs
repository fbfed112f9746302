use super::{count, delete, finder, save, search, update, Executor};
use crate::repository::MethodDescriptor;
use stratum_core::schema::EntityDetails;
use stratum_core::{Error, Result};
use std::sync::Arc;

/// Execution strategy of a repository method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutorKind {
    Count,
    Finder,
    Search,
    Save,
    Delete,
    Update,
}

type Constructor =
    fn(&str, &MethodDescriptor, Arc<EntityDetails>) -> Result<Box<dyn Executor>>;

/// Binds an executor constructor to its matching rule: the kind tag plus the
/// method-name prefixes it claims.
pub struct ExecutorDetails {
    kind: ExecutorKind,
    prefixes: &'static [&'static str],
    exclude_prefixes: &'static [&'static str],
    constructor: Constructor,
}

impl ExecutorDetails {
    pub fn new(
        kind: ExecutorKind,
        prefixes: &'static [&'static str],
        constructor: Constructor,
    ) -> Self {
        Self {
            kind,
            prefixes,
            exclude_prefixes: &[],
            constructor,
        }
    }

    pub fn exclude_prefixes(mut self, prefixes: &'static [&'static str]) -> Self {
        self.exclude_prefixes = prefixes;
        self
    }

    fn matches_name(&self, name: &str) -> bool {
        self.prefixes.iter().any(|prefix| name.starts_with(prefix))
            && !self
                .exclude_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix))
    }
}

impl std::fmt::Debug for ExecutorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorDetails")
            .field("kind", &self.kind)
            .field("prefixes", &self.prefixes)
            .field("exclude_prefixes", &self.exclude_prefixes)
            .finish()
    }
}

/// Resolves method descriptors to executors.
///
/// Resolution is deterministic: an explicit [`ExecutorKind`] tag on the
/// descriptor wins outright; otherwise entries are tried by name prefix in
/// registration order. Entries are registered once at construction and
/// read-only afterwards; a second entry for the same kind is rejected at
/// registration.
#[derive(Debug)]
pub struct ExecutorFactory {
    entries: Vec<ExecutorDetails>,
}

impl ExecutorFactory {
    /// An empty factory, for callers supplying their own entries.
    pub fn empty() -> Self {
        Self { entries: vec![] }
    }

    /// The standard factory with the built-in executors, in their canonical
    /// registration order.
    pub fn new() -> Self {
        Self {
            entries: vec![
                ExecutorDetails::new(ExecutorKind::Count, &["count"], count::construct),
                ExecutorDetails::new(ExecutorKind::Finder, &["find", "fetch"], finder::construct),
                ExecutorDetails::new(ExecutorKind::Search, &["search"], search::construct),
                ExecutorDetails::new(ExecutorKind::Save, &["save"], save::construct),
                ExecutorDetails::new(ExecutorKind::Delete, &["delete"], delete::construct),
                ExecutorDetails::new(ExecutorKind::Update, &["update"], update::construct),
            ],
        }
    }

    pub fn register(&mut self, details: ExecutorDetails) -> Result<()> {
        if self.entries.iter().any(|entry| entry.kind == details.kind) {
            return Err(Error::configuration(format!(
                "an executor is already registered for kind {:?}",
                details.kind
            )));
        }

        self.entries.push(details);
        Ok(())
    }

    /// Resolves a descriptor to a constructed executor, or `None` when no
    /// entry claims it.
    pub fn resolve(
        &self,
        repository: &str,
        descriptor: &MethodDescriptor,
        entity: Arc<EntityDetails>,
    ) -> Result<Option<Box<dyn Executor>>> {
        let entry = match descriptor.kind {
            Some(kind) => self.entries.iter().find(|entry| entry.kind == kind),
            None => self
                .entries
                .iter()
                .find(|entry| entry.matches_name(&descriptor.name)),
        };

        let Some(entry) = entry else {
            return Ok(None);
        };

        tracing::debug!(
            repository,
            method = descriptor.name,
            kind = ?entry.kind,
            "matched executor"
        );

        (entry.constructor)(repository, descriptor, entity).map(Some)
    }
}

impl Default for ExecutorFactory {
    fn default() -> Self {
        Self::new()
    }
}
