//! The collector: identity resolution, stream ingestion, retrieval

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::{Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

use peapod_core::{AppName, AppRegistry, LogLine, PeaBinding, RegistryError};
use peapod_storage::{ArchiveConfig, ArchiveError, ArchiveRegistry, LogTail};

use crate::error::CollectorResult;

/// Counts for one ingested stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Lines appended to the archive
    pub archived: u64,
    /// Lines dropped by normalization/size checks
    pub malformed: u64,
}

/// The log-archival service
///
/// Ties the platform's [`AppRegistry`] collaborator to the per-application
/// [`ArchiveRegistry`]. One collector serves every application; streams,
/// snapshots and tails for different applications never contend.
pub struct Collector {
    registry: Arc<dyn AppRegistry>,
    archives: ArchiveRegistry,
    /// Total lines archived across all streams
    archived: AtomicU64,
    /// Total lines dropped as malformed across all streams
    malformed: AtomicU64,
}

impl Collector {
    /// Create a collector over a registry collaborator
    pub fn new(registry: Arc<dyn AppRegistry>, config: ArchiveConfig) -> Self {
        Self {
            registry,
            archives: ArchiveRegistry::new(config),
            archived: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
        }
    }

    /// The per-application archives
    pub fn archives(&self) -> &ArchiveRegistry {
        &self.archives
    }

    /// Resolve a stream's declared identifier to a pea and its application
    ///
    /// No side effects beyond the registry lookup; a failure here
    /// refuses the stream before anything is ingested.
    pub async fn resolve(&self, raw_identifier: &str) -> CollectorResult<PeaBinding> {
        let identifier = raw_identifier.trim();
        if identifier.is_empty() {
            return Err(RegistryError::unknown_pea("(empty identifier)").into());
        }
        Ok(self.registry.find_pea(identifier).await?)
    }

    /// Ingest a producer's log stream until it ends
    ///
    /// Frames `reader` into lines (bounded by the configured line
    /// limit, so a producer that never sends a newline cannot grow
    /// memory without bound) and archives them under the pea's
    /// application. Runs until end-of-stream or an I/O failure; only
    /// identity resolution errors propagate.
    pub async fn ingest<R>(&self, reader: R, raw_identifier: &str) -> CollectorResult<IngestSummary>
    where
        R: AsyncRead + Unpin,
    {
        let max = self.archives.config().max_line_bytes;
        let lines = FramedRead::new(reader, LinesCodec::new_with_max_length(max));
        self.ingest_lines(lines, raw_identifier).await
    }

    /// Ingest from an already line-framed stream
    ///
    /// The switchboard uses this directly: it has consumed the header
    /// frame from the connection and hands over the remaining frames.
    pub async fn ingest_lines<S>(
        &self,
        mut lines: S,
        raw_identifier: &str,
    ) -> CollectorResult<IngestSummary>
    where
        S: Stream<Item = Result<String, LinesCodecError>> + Unpin,
    {
        let binding = self.resolve(raw_identifier).await?;
        info!(pea = %binding.pea, app = %binding.app, "archiving logs for {}", binding);

        // Bind the archive up front: a connected-but-silent pea leaves
        // an empty archive behind, not a missing one.
        let archive = self.archives.get_or_create(&binding.app);

        let mut summary = IngestSummary::default();
        while let Some(frame) = lines.next().await {
            match frame {
                Ok(text) => match archive.append(&binding.pea, &text) {
                    Ok(_) => {
                        summary.archived += 1;
                        self.archived.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(err) if err.is_invalid_line() => {
                        summary.malformed += 1;
                        self.malformed.fetch_add(1, Ordering::Relaxed);
                        debug!(pea = %binding.pea, app = %binding.app, %err, "dropped malformed line");
                    }
                    Err(err) => {
                        // Archive gone (explicit drop); nothing left to write to.
                        warn!(pea = %binding.pea, app = %binding.app, %err, "archive refused line, ending stream");
                        break;
                    }
                },
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    summary.malformed += 1;
                    self.malformed.fetch_add(1, Ordering::Relaxed);
                    debug!(pea = %binding.pea, app = %binding.app, "dropped over-long line");
                }
                Err(LinesCodecError::Io(err)) => {
                    warn!(pea = %binding.pea, app = %binding.app, error = %err, "log stream i/o error");
                    break;
                }
            }
        }

        debug!(
            pea = %binding.pea,
            app = %binding.app,
            archived = summary.archived,
            malformed = summary.malformed,
            "log stream ended"
        );
        Ok(summary)
    }

    /// The currently retained lines for an application, oldest first
    ///
    /// An application whose archive exists but holds nothing yields an
    /// empty Vec; a never-seen application is an error.
    pub fn recent(&self, app: &AppName) -> CollectorResult<Vec<LogLine>> {
        let archive = self
            .archives
            .get(app)
            .ok_or_else(|| ArchiveError::AppNotFound(app.clone()))?;
        Ok(archive.snapshot()?)
    }

    /// Follow an application's new lines as they arrive
    ///
    /// The consumer cancels by dropping the returned tail; the archive
    /// releases its buffer with no effect on the store.
    pub fn tail(&self, app: &AppName) -> CollectorResult<LogTail> {
        let archive = self
            .archives
            .get(app)
            .ok_or_else(|| ArchiveError::AppNotFound(app.clone()))?;
        Ok(archive.subscribe()?)
    }

    /// Release an application's archive; idempotent
    pub fn drop_app(&self, app: &AppName) {
        self.archives.drop_app(app);
    }

    /// Total lines archived across all streams
    pub fn archived_lines(&self) -> u64 {
        self.archived.load(Ordering::Relaxed)
    }

    /// Total lines dropped as malformed across all streams
    pub fn malformed_lines(&self) -> u64 {
        self.malformed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peapod_core::InMemoryAppRegistry;

    fn collector_with(config: ArchiveConfig) -> Collector {
        let registry = Arc::new(InMemoryAppRegistry::new());
        registry.register("web.1", "todo-list");
        Collector::new(registry, config)
    }

    fn collector() -> Collector {
        collector_with(ArchiveConfig::default())
    }

    fn texts(lines: &[LogLine]) -> Vec<&str> {
        lines.iter().map(|line| line.text.as_str()).collect()
    }

    #[tokio::test]
    async fn test_ingest_archives_lines_in_order() {
        let collector = collector();
        let summary = collector
            .ingest(&b"starting up\nlistening on 8080\n"[..], "web.1")
            .await
            .unwrap();

        assert_eq!(summary.archived, 2);
        assert_eq!(summary.malformed, 0);

        let lines = collector.recent(&AppName::from("todo-list")).unwrap();
        assert_eq!(texts(&lines), vec!["starting up", "listening on 8080"]);
        assert_eq!(lines[0].pea, peapod_core::PeaName::from("web.1"));
        assert_eq!(lines[0].sequence, 1);
    }

    #[tokio::test]
    async fn test_ingest_unknown_pea_stores_nothing() {
        let collector = collector();
        let err = collector
            .ingest(&b"should never land\n"[..], "ghost")
            .await
            .unwrap_err();

        assert!(err.is_unknown_pea());
        assert!(collector.archives().is_empty());
        assert_eq!(collector.archived_lines(), 0);
    }

    #[tokio::test]
    async fn test_blank_identifier_is_refused() {
        let collector = collector();
        let err = collector.ingest(&b"line\n"[..], "   ").await.unwrap_err();
        assert!(err.is_unknown_pea());
    }

    #[tokio::test]
    async fn test_malformed_lines_are_skipped_not_fatal() {
        let collector = collector();
        let summary = collector
            .ingest(&b"good one\n\n   \t\nanother good one\n"[..], "web.1")
            .await
            .unwrap();

        assert_eq!(summary.archived, 2);
        assert_eq!(summary.malformed, 2);
        assert_eq!(collector.malformed_lines(), 2);

        let lines = collector.recent(&AppName::from("todo-list")).unwrap();
        assert_eq!(texts(&lines), vec!["good one", "another good one"]);
    }

    #[tokio::test]
    async fn test_over_long_line_dropped_stream_continues() {
        let collector = collector_with(ArchiveConfig::new().with_max_line_bytes(8));
        let input = b"this line is far too long for the limit\nok\n";
        let summary = collector.ingest(&input[..], "web.1").await.unwrap();

        assert_eq!(summary.archived, 1);
        assert_eq!(summary.malformed, 1);

        let lines = collector.recent(&AppName::from("todo-list")).unwrap();
        assert_eq!(texts(&lines), vec!["ok"]);
    }

    #[tokio::test]
    async fn test_silent_pea_leaves_empty_archive() {
        let collector = collector();
        let summary = collector.ingest(&b""[..], "web.1").await.unwrap();

        assert_eq!(summary, IngestSummary::default());
        // The archive exists and is empty, not missing.
        let lines = collector.recent(&AppName::from("todo-list")).unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_recent_on_never_seen_app() {
        let collector = collector();
        let err = collector.recent(&AppName::from("ghost")).unwrap_err();
        assert!(err.is_app_not_found());
    }

    #[tokio::test]
    async fn test_tail_follows_live_ingest() {
        let collector = collector();
        collector.ingest(&b"first\n"[..], "web.1").await.unwrap();

        let mut tail = collector.tail(&AppName::from("todo-list")).unwrap();
        collector.ingest(&b"second\n"[..], "web.1").await.unwrap();

        // Only the line appended after subscribing arrives.
        assert_eq!(tail.recv().await.unwrap().text, "second");
    }

    #[tokio::test]
    async fn test_final_line_without_newline_is_archived() {
        let collector = collector();
        let summary = collector
            .ingest(&b"complete\ntruncated by close"[..], "web.1")
            .await
            .unwrap();

        assert_eq!(summary.archived, 2);
        let lines = collector.recent(&AppName::from("todo-list")).unwrap();
        assert_eq!(texts(&lines), vec!["complete", "truncated by close"]);
    }

    #[tokio::test]
    async fn test_drop_app_then_reingest_starts_fresh() {
        let collector = collector();
        collector.ingest(&b"old\n"[..], "web.1").await.unwrap();
        collector.drop_app(&AppName::from("todo-list"));
        assert!(collector.recent(&AppName::from("todo-list")).is_err());

        collector.ingest(&b"new\n"[..], "web.1").await.unwrap();
        let lines = collector.recent(&AppName::from("todo-list")).unwrap();
        assert_eq!(texts(&lines), vec!["new"]);
        assert_eq!(lines[0].sequence, 1);
    }
}
