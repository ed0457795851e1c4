//! Application registry lookups
//!
//! The registry maps a pea's declared identifier to its owning
//! application. Population and lifecycle of the registry belong to the
//! wider platform; the collector only ever asks one question of it:
//! "whose pea is this?".

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::RegistryError;
use crate::identity::{AppName, PeaBinding, PeaName};

/// Lookup of which application a pea belongs to
///
/// Implementations may sit in front of a database, a control-plane API,
/// or (for tests and single-node setups) a plain in-memory map.
#[async_trait]
pub trait AppRegistry: Send + Sync {
    /// Resolve a pea identifier to its owning application
    ///
    /// Fails with [`RegistryError::UnknownPea`] when the identifier is
    /// not currently registered.
    async fn find_pea(&self, identifier: &str) -> Result<PeaBinding, RegistryError>;
}

/// In-memory registry implementation
///
/// Uses `DashMap` for concurrent access. Suitable for tests and for
/// single-node deployments where peas are registered at startup.
#[derive(Debug, Default)]
pub struct InMemoryAppRegistry {
    /// Map from pea name to owning application
    peas: DashMap<PeaName, AppName>,
}

impl InMemoryAppRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            peas: DashMap::new(),
        }
    }

    /// Register a pea as belonging to an application
    ///
    /// Re-registering an existing pea moves it to the new application.
    pub fn register(&self, pea: impl Into<PeaName>, app: impl Into<AppName>) {
        self.peas.insert(pea.into(), app.into());
    }

    /// Remove a pea from the registry
    ///
    /// Returns whether the pea was present.
    pub fn deregister(&self, pea: &PeaName) -> bool {
        self.peas.remove(pea).is_some()
    }

    /// Number of registered peas
    pub fn len(&self) -> usize {
        self.peas.len()
    }

    /// Check whether any peas are registered
    pub fn is_empty(&self) -> bool {
        self.peas.is_empty()
    }
}

#[async_trait]
impl AppRegistry for InMemoryAppRegistry {
    async fn find_pea(&self, identifier: &str) -> Result<PeaBinding, RegistryError> {
        let pea = PeaName::from(identifier);
        match self.peas.get(&pea) {
            Some(app) => Ok(PeaBinding {
                app: app.clone(),
                pea,
            }),
            None => Err(RegistryError::unknown_pea(identifier)),
        }
    }
}
