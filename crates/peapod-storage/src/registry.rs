//! Registry of per-application archives

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use peapod_core::AppName;

use crate::archive::LogArchive;
use crate::config::ArchiveConfig;

/// Concurrency-safe map from application to its [`LogArchive`]
///
/// The only shared structure in the collector: concurrent lookups are
/// the common case, inserts happen once per application (lazily, when
/// its first stream binds) and removals only on explicit drop. There
/// is no cross-application locking; archives are fully independent.
#[derive(Debug)]
pub struct ArchiveRegistry {
    archives: DashMap<AppName, Arc<LogArchive>>,
    config: ArchiveConfig,
}

impl ArchiveRegistry {
    /// Create an empty registry; archives inherit `config`
    pub fn new(config: ArchiveConfig) -> Self {
        Self {
            archives: DashMap::new(),
            config,
        }
    }

    /// Get the application's archive, creating it if absent
    pub fn get_or_create(&self, app: &AppName) -> Arc<LogArchive> {
        self.archives
            .entry(app.clone())
            .or_insert_with(|| {
                debug!(app = %app, "created log archive");
                Arc::new(LogArchive::new(app.clone(), &self.config))
            })
            .clone()
    }

    /// Get the application's archive if one exists
    pub fn get(&self, app: &AppName) -> Option<Arc<LogArchive>> {
        self.archives.get(app).map(|entry| entry.clone())
    }

    /// Drop an application's archive; idempotent
    ///
    /// Retained lines are released and all tails closed. A later
    /// stream for the same application starts a fresh archive.
    pub fn drop_app(&self, app: &AppName) {
        if let Some((_, archive)) = self.archives.remove(app) {
            archive.drop_archive();
        }
    }

    /// Applications that currently have an archive
    pub fn apps(&self) -> Vec<AppName> {
        self.archives.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of live archives
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    /// Check whether any archives exist
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// The configuration new archives are created with
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }
}
