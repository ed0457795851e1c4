//! # Peapod Storage
//!
//! Bounded per-application log archives.
//!
//! Each application gets a [`LogArchive`]: an insertion-ordered buffer
//! holding at most `capacity` recent lines. Appending past capacity
//! evicts the single oldest line first (strict FIFO), so the archive
//! always reflects pure recency. Archives are created lazily through
//! the [`ArchiveRegistry`] and live for the process lifetime unless
//! explicitly dropped.
//!
//! Readers get point-in-time [`LogArchive::snapshot`] copies; live
//! consumers [`LogArchive::subscribe`] for a [`LogTail`] fed from a
//! bounded broadcast buffer. A tail that falls behind is disconnected
//! with [`TailError::Overrun`]: backpressure lands on the subscriber,
//! never on the producer.

pub mod archive;
pub mod config;
pub mod error;
pub mod registry;
pub mod tail;

pub use archive::{ArchiveState, LogArchive};
pub use config::ArchiveConfig;
pub use error::{ArchiveError, TailError};
pub use registry::ArchiveRegistry;
pub use tail::LogTail;
