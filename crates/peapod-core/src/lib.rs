//! # Peapod Core
//!
//! Core types and collaborator interfaces for the Peapod log collector.
//!
//! Peapod archives the stdout of running application instances ("peas"):
//! each pea streams newline-delimited text to the collector, which keeps
//! a bounded recent window per application. This crate holds the domain
//! vocabulary shared by the storage and collector crates:
//!
//! - [`AppName`] / [`PeaName`]: identifiers for applications and their
//!   running instances
//! - [`LogLine`]: one archived line of output
//! - [`AppRegistry`]: lookup of which application a pea belongs to
//!   (registry population is owned by the wider platform)
//! - [`ServiceProvisioner`]: the credential-provisioning collaborator
//!   (interface only; no provisioning logic lives here)

pub mod error;
pub mod identity;
pub mod line;
pub mod provision;
pub mod registry;

pub use error::*;
pub use identity::*;
pub use line::*;
pub use provision::*;
pub use registry::*;
