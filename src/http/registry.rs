//! Path to handler table.
//!
//! The table is filled once at startup and shared read-only afterwards
//! (`Arc<HandlerRegistry>`), so lookups need no locking.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Default number of routes a registry accepts.
pub const DEFAULT_CAPACITY: usize = 3;

/// Something that can serve a path.
///
/// Receives the raw parameter string and reports success or failure.
pub trait Handler: Send + Sync {
    fn call(&self, params: &str) -> bool;
}

impl<F> Handler for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn call(&self, params: &str) -> bool {
        self(params)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("handler table is full ({capacity} routes)")]
    CapacityExceeded { capacity: usize },
    #[error("path {0:?} is already registered")]
    DuplicatePath(String),
}

/// One path-to-handler registration.
#[derive(Clone)]
pub struct Mapping {
    path: String,
    handler: Arc<dyn Handler>,
}

impl Mapping {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapping").field("path", &self.path).finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct HandlerRegistry {
    capacity: usize,
    mappings: Vec<Mapping>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl HandlerRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            mappings: Vec::with_capacity(capacity),
        }
    }

    /// Adds a route.
    ///
    /// Fails without touching existing routes when the table is full or the
    /// path is already taken.
    pub fn register<H>(&mut self, path: impl Into<String>, handler: H) -> Result<(), RegistryError>
    where
        H: Handler + 'static,
    {
        self.register_shared(path, Arc::new(handler))
    }

    pub fn register_shared(
        &mut self,
        path: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Result<(), RegistryError> {
        let path = path.into();

        if self.mappings.iter().any(|m| m.path == path) {
            tracing::warn!(path = %path, "rejecting duplicate route");
            return Err(RegistryError::DuplicatePath(path));
        }
        if self.mappings.len() >= self.capacity {
            return Err(RegistryError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        tracing::debug!(path = %path, slot = self.mappings.len(), "route registered");
        self.mappings.push(Mapping { path, handler });
        Ok(())
    }

    /// First handler whose path equals `path` exactly.
    pub fn lookup(&self, path: &str) -> Option<Arc<dyn Handler>> {
        self.mappings
            .iter()
            .find(|m| m.path == path)
            .map(|m| Arc::clone(&m.handler))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.mappings.iter().map(|m| m.path.as_str())
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
