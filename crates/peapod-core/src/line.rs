//! Archived log lines

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{AppName, PeaName};

/// One archived line of container output
///
/// Immutable once created. `text` is a single line with surrounding
/// whitespace already trimmed; the ingestion protocol forbids embedded
/// newlines. `sequence` increases monotonically per application and is
/// assigned at append time, so tailing consumers can detect gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// Application the line belongs to
    pub app: AppName,
    /// Pea that produced the line
    pub pea: PeaName,
    /// The raw text, trimmed, without a trailing newline
    pub text: String,
    /// Per-application sequence number, starting at 1
    pub sequence: u64,
    /// When the collector appended the line
    pub arrived_at: DateTime<Utc>,
}

impl LogLine {
    /// Record a line as of now
    pub fn record(
        app: AppName,
        pea: PeaName,
        sequence: u64,
        text: impl Into<String>,
    ) -> Self {
        Self {
            app,
            pea,
            text: text.into(),
            sequence,
            arrived_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_stamps_arrival() {
        let before = Utc::now();
        let line = LogLine::record("todo-list".into(), "web.1".into(), 1, "booted");
        assert!(line.arrived_at >= before);
        assert_eq!(line.sequence, 1);
        assert_eq!(line.text, "booted");
    }
}
