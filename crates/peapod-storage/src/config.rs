//! Configuration for log archives

/// Sizing for per-application archives
///
/// The retention window is an explicit line count, not a byte budget:
/// log tails must reflect pure recency, and a fixed count makes the
/// eviction contract testable.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Maximum retained lines per application
    pub capacity: usize,
    /// Maximum bytes in a single line, measured after trimming
    pub max_line_bytes: usize,
    /// Per-subscriber tail delivery buffer, in lines
    pub tail_buffer: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            max_line_bytes: 64 * 1024,
            tail_buffer: 1024,
        }
    }
}

impl ArchiveConfig {
    /// Create a configuration with the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retained-line capacity (clamped to at least 1)
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Set the single-line byte limit (clamped to at least 1)
    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes.max(1);
        self
    }

    /// Set the per-subscriber tail buffer (clamped to at least 1)
    pub fn with_tail_buffer(mut self, tail_buffer: usize) -> Self {
        self.tail_buffer = tail_buffer.max(1);
        self
    }
}
