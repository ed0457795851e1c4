//! # Peapod Collector
//!
//! The log-archival service of the Peapod platform.
//!
//! Every running pea streams its container's stdout to this collector.
//! A stream opens with an identifier frame, which the collector
//! resolves against the platform's [`peapod_core::AppRegistry`]; the
//! rest of the connection is newline-delimited log lines, appended to
//! the owning application's bounded [`peapod_storage::LogArchive`]
//! until the producer disconnects. Consumers read the retained window
//! back with [`Collector::recent`] or follow it live with
//! [`Collector::tail`].
//!
//! The TCP front-end is the [`Switchboard`]: one task per connection,
//! dispatching on a single header line (`archive <pea>`,
//! `recent <app>`, `tail <app>`).
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use peapod_collector::{Collector, CollectorConfig, Switchboard};
//! use peapod_core::InMemoryAppRegistry;
//!
//! let registry = Arc::new(InMemoryAppRegistry::new());
//! registry.register("web.1", "todo-list");
//!
//! let config = CollectorConfig::default();
//! let collector = Arc::new(Collector::new(registry, config.archive.clone()));
//! let switchboard = Switchboard::bind(collector, config.bind).await?;
//! switchboard.serve().await?;
//! ```

pub mod collector;
pub mod config;
pub mod error;
pub mod switchboard;

pub use collector::{Collector, IngestSummary};
pub use config::{CollectorConfig, DEFAULT_PORT};
pub use error::{CollectorError, CollectorResult};
pub use switchboard::{Command, Switchboard};
