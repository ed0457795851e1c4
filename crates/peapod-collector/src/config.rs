//! Configuration for the collector process

use std::net::SocketAddr;

use peapod_storage::ArchiveConfig;

/// Port the switchboard listens on by default
pub const DEFAULT_PORT: u16 = 9345;

/// Configuration for a collector
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Address the switchboard listens on
    pub bind: SocketAddr,
    /// Sizing for per-application archives
    pub archive: ArchiveConfig,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            archive: ArchiveConfig::default(),
        }
    }
}

impl CollectorConfig {
    /// Set the listen address
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Set the archive sizing
    pub fn with_archive(mut self, archive: ArchiveConfig) -> Self {
        self.archive = archive;
        self
    }
}
