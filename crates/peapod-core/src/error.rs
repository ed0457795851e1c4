//! Error types for peapod-core

use thiserror::Error;

/// Errors from the application registry collaborator
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The identifier does not map to a known, registered pea
    #[error("unknown pea: {0}")]
    UnknownPea(String),

    /// The registry backend could not be reached or answered garbage
    #[error("registry backend error: {0}")]
    Backend(String),
}

impl RegistryError {
    /// Create a new UnknownPea error
    pub fn unknown_pea(identifier: impl Into<String>) -> Self {
        Self::UnknownPea(identifier.into())
    }

    /// Create a new Backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Errors from the service provisioner collaborator
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The backing service is not reachable
    #[error("service backend unavailable: {0}")]
    Unavailable(String),

    /// The provisioning command ran but failed
    #[error("provisioning command failed: {0}")]
    CommandFailed(String),
}
