//! Error types for peapod-collector

use peapod_core::RegistryError;
use peapod_storage::ArchiveError;
use thiserror::Error;

/// Errors that can occur in the collector
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The stream's identifier did not resolve to a registered pea
    #[error("identity resolution failed: {0}")]
    Resolve(#[from] RegistryError),

    /// A connection's header frame could not be parsed
    #[error("malformed header: {0}")]
    BadHeader(String),

    /// The archive layer refused an operation
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// I/O failure on a connection
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollectorError {
    /// Create a new BadHeader error
    pub fn bad_header(reason: impl Into<String>) -> Self {
        Self::BadHeader(reason.into())
    }

    /// Whether this is an unknown-pea resolution failure
    pub fn is_unknown_pea(&self) -> bool {
        matches!(self, Self::Resolve(RegistryError::UnknownPea(_)))
    }

    /// Whether this is a retrieval miss for a never-seen application
    pub fn is_app_not_found(&self) -> bool {
        matches!(self, Self::Archive(ArchiveError::AppNotFound(_)))
    }
}

/// Result type for collector operations
pub type CollectorResult<T> = Result<T, CollectorError>;
