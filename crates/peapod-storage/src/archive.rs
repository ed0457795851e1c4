//! The per-application bounded log archive

use std::collections::VecDeque;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tracing::{debug, trace};

use peapod_core::{AppName, LogLine, PeaName};

use crate::config::ArchiveConfig;
use crate::error::ArchiveError;
use crate::tail::LogTail;

/// Lifecycle state of a [`LogArchive`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveState {
    /// Created but nothing appended yet
    Empty,
    /// Holding lines, capacity enforced
    Active,
    /// Explicitly dropped; terminal
    Dropped,
}

/// Bounded, insertion-ordered archive of one application's log lines
///
/// Holds at most `capacity` lines; appending at capacity evicts the
/// single oldest line first, so a snapshot is always exactly the most
/// recent `min(capacity, total_appends)` lines in arrival order.
///
/// All mutation happens under one write lock, which is also where
/// sequence numbers are assigned, so concurrent appenders for the same
/// application get gapless, duplicate-free sequences, and tail
/// subscribers observe lines in exactly buffer order. Fan-out to tails
/// goes through a bounded broadcast channel and never blocks an
/// appender.
#[derive(Debug)]
pub struct LogArchive {
    app: AppName,
    capacity: usize,
    max_line_bytes: usize,
    inner: RwLock<Inner>,
    /// Lines rejected by normalization/size checks
    rejected: AtomicU64,
}

#[derive(Debug)]
struct Inner {
    lines: VecDeque<LogLine>,
    next_sequence: u64,
    state: ArchiveState,
    /// Present while the archive is live; dropped on `drop_archive`,
    /// which closes every subscribed tail.
    tail_tx: Option<broadcast::Sender<LogLine>>,
}

impl LogArchive {
    /// Create an empty archive for an application
    pub fn new(app: AppName, config: &ArchiveConfig) -> Self {
        let (tail_tx, _) = broadcast::channel(config.tail_buffer);
        Self {
            app,
            capacity: config.capacity.max(1),
            max_line_bytes: config.max_line_bytes.max(1),
            inner: RwLock::new(Inner {
                lines: VecDeque::with_capacity(config.capacity.max(1)),
                next_sequence: 1,
                state: ArchiveState::Empty,
                tail_tx: Some(tail_tx),
            }),
            rejected: AtomicU64::new(0),
        }
    }

    /// The application this archive belongs to
    pub fn app(&self) -> &AppName {
        &self.app
    }

    /// Maximum retained lines
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append one line from a pea, returning its sequence number
    ///
    /// The line is trimmed first. Empty and over-long lines are
    /// rejected with [`ArchiveError::InvalidLine`] and consume no
    /// sequence number. At capacity the oldest line is evicted before
    /// the new one is stored.
    pub fn append(&self, pea: &PeaName, text: &str) -> Result<u64, ArchiveError> {
        let text = text.trim();
        if text.is_empty() {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(ArchiveError::invalid_line("empty after trimming"));
        }
        if text.len() > self.max_line_bytes {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(ArchiveError::invalid_line(format!(
                "line is {} bytes, limit is {}",
                text.len(),
                self.max_line_bytes
            )));
        }

        let mut inner = self.write()?;
        if inner.state == ArchiveState::Dropped {
            return Err(ArchiveError::Dropped(self.app.clone()));
        }

        let sequence = inner.next_sequence;
        inner.next_sequence += 1;

        let line = LogLine::record(self.app.clone(), pea.clone(), sequence, text);

        if inner.lines.len() >= self.capacity {
            if let Some(evicted) = inner.lines.pop_front() {
                trace!(
                    app = %self.app,
                    sequence = evicted.sequence,
                    "evicted oldest line at capacity"
                );
            }
        }
        inner.lines.push_back(line.clone());
        inner.state = ArchiveState::Active;

        // Send never blocks; a full subscriber buffer surfaces as a
        // Lagged error on that subscriber's side only.
        if let Some(tx) = &inner.tail_tx {
            let _ = tx.send(line);
        }

        Ok(sequence)
    }

    /// Point-in-time copy of the retained lines, oldest first
    ///
    /// Later appends and evictions never mutate a returned snapshot.
    pub fn snapshot(&self) -> Result<Vec<LogLine>, ArchiveError> {
        let inner = self.read()?;
        Ok(inner.lines.iter().cloned().collect())
    }

    /// Subscribe to lines appended after this call
    ///
    /// The returned [`LogTail`] has a bounded delivery buffer; if the
    /// subscriber falls behind it is disconnected with an overrun
    /// error rather than slowing the producer. Dropping the tail
    /// cancels the subscription.
    pub fn subscribe(&self) -> Result<LogTail, ArchiveError> {
        let inner = self.read()?;
        match &inner.tail_tx {
            Some(tx) => Ok(LogTail::new(tx.subscribe())),
            None => Err(ArchiveError::Dropped(self.app.clone())),
        }
    }

    /// Release all retained lines and close every subscribed tail
    ///
    /// Terminal and idempotent; later appends fail and later
    /// subscriptions are refused.
    pub fn drop_archive(&self) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        if inner.state == ArchiveState::Dropped {
            return;
        }
        inner.lines.clear();
        inner.state = ArchiveState::Dropped;
        // Dropping the sender closes all outstanding receivers.
        inner.tail_tx = None;
        debug!(app = %self.app, "log archive dropped");
    }

    /// Current lifecycle state
    pub fn state(&self) -> ArchiveState {
        self.inner
            .read()
            .map(|inner| inner.state)
            .unwrap_or(ArchiveState::Dropped)
    }

    /// Number of currently retained lines
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.lines.len()).unwrap_or(0)
    }

    /// Check whether no lines are retained
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live tail subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.tail_tx.as_ref().map(|tx| tx.receiver_count()))
            .unwrap_or(0)
    }

    /// Total lines rejected by normalization/size checks
    pub fn rejected_lines(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, ArchiveError> {
        self.inner
            .read()
            .map_err(|_| ArchiveError::poisoned("failed to acquire read lock"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, ArchiveError> {
        self.inner
            .write()
            .map_err(|_| ArchiveError::poisoned("failed to acquire write lock"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TailError;

    fn archive(capacity: usize) -> LogArchive {
        LogArchive::new(
            AppName::from("todo-list"),
            &ArchiveConfig::new().with_capacity(capacity),
        )
    }

    fn pea() -> PeaName {
        PeaName::from("web.1")
    }

    fn texts(archive: &LogArchive) -> Vec<String> {
        archive
            .snapshot()
            .unwrap()
            .into_iter()
            .map(|line| line.text)
            .collect()
    }

    #[test]
    fn test_append_assigns_increasing_sequences() {
        let archive = archive(10);
        assert_eq!(archive.append(&pea(), "one").unwrap(), 1);
        assert_eq!(archive.append(&pea(), "two").unwrap(), 2);
        assert_eq!(archive.append(&pea(), "three").unwrap(), 3);
    }

    #[test]
    fn test_capacity_evicts_oldest_first() {
        let archive = archive(3);
        for text in ["a", "b", "c", "d"] {
            archive.append(&pea(), text).unwrap();
        }
        assert_eq!(texts(&archive), vec!["b", "c", "d"]);
        assert_eq!(archive.len(), 3);
    }

    #[test]
    fn test_len_never_exceeds_capacity() {
        let archive = archive(5);
        for i in 0..50 {
            archive.append(&pea(), &format!("line {}", i)).unwrap();
            assert!(archive.len() <= 5);
        }
        // The last min(C, total) lines, in arrival order.
        assert_eq!(
            texts(&archive),
            (45..50).map(|i| format!("line {}", i)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_lines_are_trimmed() {
        let archive = archive(10);
        archive.append(&pea(), "  padded \t").unwrap();
        assert_eq!(texts(&archive), vec!["padded"]);
    }

    #[test]
    fn test_blank_lines_rejected_without_consuming_sequence() {
        let archive = archive(10);
        assert!(archive.append(&pea(), "").unwrap_err().is_invalid_line());
        assert!(archive.append(&pea(), "   \t ").unwrap_err().is_invalid_line());
        // Rejected lines never reach the buffer or burn a sequence number.
        assert_eq!(archive.append(&pea(), "real").unwrap(), 1);
        assert_eq!(texts(&archive), vec!["real"]);
        assert_eq!(archive.rejected_lines(), 2);
    }

    #[test]
    fn test_oversized_line_rejected() {
        let archive = LogArchive::new(
            AppName::from("todo-list"),
            &ArchiveConfig::new().with_max_line_bytes(8),
        );
        let err = archive.append(&pea(), "123456789").unwrap_err();
        assert!(err.is_invalid_line());
        assert_eq!(archive.len(), 0);
        assert_eq!(archive.rejected_lines(), 1);
    }

    #[test]
    fn test_snapshot_is_point_in_time() {
        let archive = archive(3);
        archive.append(&pea(), "a").unwrap();
        let snapshot = archive.snapshot().unwrap();
        for text in ["b", "c", "d"] {
            archive.append(&pea(), text).unwrap();
        }
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].text, "a");
    }

    #[test]
    fn test_state_machine() {
        let archive = archive(3);
        assert_eq!(archive.state(), ArchiveState::Empty);

        archive.append(&pea(), "a").unwrap();
        assert_eq!(archive.state(), ArchiveState::Active);

        archive.drop_archive();
        assert_eq!(archive.state(), ArchiveState::Dropped);
        assert_eq!(archive.len(), 0);

        // Terminal: no appends, no new tails, second drop is a no-op.
        assert!(matches!(
            archive.append(&pea(), "b").unwrap_err(),
            ArchiveError::Dropped(_)
        ));
        assert!(matches!(
            archive.subscribe().unwrap_err(),
            ArchiveError::Dropped(_)
        ));
        archive.drop_archive();
        assert_eq!(archive.state(), ArchiveState::Dropped);
    }

    #[tokio::test]
    async fn test_tail_sees_only_later_lines() {
        let archive = archive(10);
        archive.append(&pea(), "before").unwrap();

        let mut tail = archive.subscribe().unwrap();
        archive.append(&pea(), "after-1").unwrap();
        archive.append(&pea(), "after-2").unwrap();

        assert_eq!(tail.recv().await.unwrap().text, "after-1");
        assert_eq!(tail.recv().await.unwrap().text, "after-2");
    }

    #[tokio::test]
    async fn test_slow_tail_is_disconnected_with_overrun() {
        let archive = LogArchive::new(
            AppName::from("todo-list"),
            &ArchiveConfig::new().with_capacity(100).with_tail_buffer(2),
        );
        let mut tail = archive.subscribe().unwrap();

        // Overfill the delivery buffer without draining it; appends
        // must keep succeeding regardless.
        for i in 0..5 {
            archive.append(&pea(), &format!("line {}", i)).unwrap();
        }
        assert_eq!(archive.len(), 5);

        let err = tail.recv().await.unwrap_err();
        assert!(matches!(err, TailError::Overrun(_)));
        // Torn down for good.
        assert_eq!(tail.recv().await.unwrap_err(), TailError::Closed);
    }

    #[tokio::test]
    async fn test_drop_archive_closes_tails() {
        let archive = archive(10);
        let mut tail = archive.subscribe().unwrap();
        assert_eq!(archive.subscriber_count(), 1);

        archive.drop_archive();
        assert_eq!(tail.recv().await.unwrap_err(), TailError::Closed);
        assert_eq!(archive.subscriber_count(), 0);
    }
}
