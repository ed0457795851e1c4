//! Error types for peapod-storage

use peapod_core::AppName;
use thiserror::Error;

/// Errors that can occur on archive operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// A single line failed normalization or size checks
    #[error("invalid line: {0}")]
    InvalidLine(String),

    /// No archive exists for the requested application
    #[error("application not found: {0}")]
    AppNotFound(AppName),

    /// The archive was explicitly dropped; no further appends or tails
    #[error("log archive for {0} has been dropped")]
    Dropped(AppName),

    /// A lock was poisoned by a panicking writer
    #[error("archive lock poisoned: {0}")]
    Poisoned(String),
}

impl ArchiveError {
    /// Create a new InvalidLine error
    pub fn invalid_line(reason: impl Into<String>) -> Self {
        Self::InvalidLine(reason.into())
    }

    /// Create a new Poisoned error
    pub fn poisoned(message: impl Into<String>) -> Self {
        Self::Poisoned(message.into())
    }

    /// Whether this error only affects the offending line, not the stream
    pub fn is_invalid_line(&self) -> bool {
        matches!(self, Self::InvalidLine(_))
    }
}

/// Why a [`crate::LogTail`] stopped yielding lines
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TailError {
    /// The subscriber fell behind its delivery buffer and was torn down
    ///
    /// Carries the number of lines that were skipped before teardown.
    #[error("tail fell behind the archive, {0} lines skipped")]
    Overrun(u64),

    /// The archive was dropped, or the tail already ended
    #[error("archive closed")]
    Closed,
}
