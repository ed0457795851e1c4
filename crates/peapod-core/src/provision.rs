//! Service provisioner collaborator interface
//!
//! The platform provisions backing-service credentials (databases and
//! the like) for applications. That subsystem lives outside the log
//! collector; this trait is the narrow seam it is reached through.

use async_trait::async_trait;

use crate::error::ProvisionError;
use crate::identity::AppName;

/// Provisioning of backing-service credentials for an application
///
/// `create` returns a connection URI carrying the freshly minted
/// credentials; `destroy` revokes them and drops the service's data.
/// The log-archival path never calls either; the trait exists so the
/// rest of the platform and the collector share one vocabulary.
#[async_trait]
pub trait ServiceProvisioner: Send + Sync {
    /// Provision the service for an application, returning a connection URI
    async fn create(&self, app: &AppName) -> Result<String, ProvisionError>;

    /// Revoke the application's credentials and drop its data
    async fn destroy(&self, app: &AppName) -> Result<(), ProvisionError>;
}
