//! Live tailing of an archive

use tokio::sync::broadcast;

use peapod_core::LogLine;

use crate::error::TailError;

/// A live subscription to one application's newly appended lines
///
/// Yields lines in append order, starting from the moment of
/// subscription. Delivery runs through a bounded buffer: a tail that
/// falls behind is torn down with [`TailError::Overrun`] instead of
/// ever stalling the producer. Dropping the tail cancels it.
#[derive(Debug)]
pub struct LogTail {
    rx: Option<broadcast::Receiver<LogLine>>,
}

impl LogTail {
    pub(crate) fn new(rx: broadcast::Receiver<LogLine>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Wait for the next appended line
    ///
    /// Returns [`TailError::Closed`] once the archive is dropped or
    /// after the tail has overrun; an overrun is reported exactly once.
    pub async fn recv(&mut self) -> Result<LogLine, TailError> {
        let Some(rx) = self.rx.as_mut() else {
            return Err(TailError::Closed);
        };
        match rx.recv().await {
            Ok(line) => Ok(line),
            Err(broadcast::error::RecvError::Closed) => {
                self.rx = None;
                Err(TailError::Closed)
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                self.rx = None;
                Err(TailError::Overrun(skipped))
            }
        }
    }

    /// Whether the tail can still yield lines
    pub fn is_live(&self) -> bool {
        self.rx.is_some()
    }
}
