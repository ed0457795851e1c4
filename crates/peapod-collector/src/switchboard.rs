//! The switchboard TCP front-end
//!
//! One listening socket, one spawned task per connection. The first
//! frame of every connection is a header line naming the command and
//! its target; everything after that belongs to the command:
//!
//! - `archive <pea>`: the rest of the stream is the pea's log output,
//!   fire-and-forget (no acknowledgement frames are ever sent back)
//! - `recent <app>`: the retained window is written back, one
//!   `pea: text` line each, then the connection closes
//! - `tail <app>`: new lines stream back as they arrive, until the
//!   client goes away or falls too far behind

use std::net::SocketAddr;
use std::sync::Arc;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

use peapod_core::{AppName, LogLine};
use peapod_storage::{LogTail, TailError};

use crate::collector::Collector;
use crate::error::{CollectorError, CollectorResult};

/// One parsed header frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Archive the rest of the stream under a pea's application
    Archive {
        /// The pea's declared identifier, resolved by the collector
        pea: String,
    },
    /// Write the retained window back and close
    Recent {
        /// Application to read
        app: AppName,
    },
    /// Stream newly appended lines until the client disconnects
    Tail {
        /// Application to follow
        app: AppName,
    },
}

impl Command {
    /// Parse a header line
    pub fn parse(header: &str) -> CollectorResult<Self> {
        let mut parts = header.split_whitespace();
        let verb = parts
            .next()
            .ok_or_else(|| CollectorError::bad_header("empty header"))?;
        let target = parts
            .next()
            .ok_or_else(|| CollectorError::bad_header(format!("{} needs an identifier", verb)))?;
        if parts.next().is_some() {
            return Err(CollectorError::bad_header("trailing tokens after identifier"));
        }
        match verb {
            "archive" => Ok(Self::Archive {
                pea: target.to_string(),
            }),
            "recent" => Ok(Self::Recent {
                app: AppName::from(target),
            }),
            "tail" => Ok(Self::Tail {
                app: AppName::from(target),
            }),
            other => Err(CollectorError::bad_header(format!(
                "unknown command: {}",
                other
            ))),
        }
    }
}

/// TCP server multiplexing ingestion and retrieval connections
pub struct Switchboard {
    collector: Arc<Collector>,
    listener: TcpListener,
}

impl Switchboard {
    /// Bind the listening socket
    pub async fn bind(collector: Arc<Collector>, addr: SocketAddr) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "switchboard listening");
        Ok(Self {
            collector,
            listener,
        })
    }

    /// The address actually bound (useful with port 0)
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the listener fails
    ///
    /// Each connection runs in its own task; a connection's failure is
    /// logged and contained there, never propagated to the accept loop
    /// or to other connections.
    pub async fn serve(self) -> std::io::Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let collector = self.collector.clone();
            tokio::spawn(async move {
                if let Err(err) = handle_connection(collector, stream).await {
                    debug!(peer = %peer, error = %err, "connection ended with error");
                }
            });
        }
    }
}

async fn handle_connection(
    collector: Arc<Collector>,
    stream: TcpStream,
) -> CollectorResult<()> {
    let (read_half, mut write_half) = stream.into_split();
    let max = collector.archives().config().max_line_bytes;
    let mut frames = FramedRead::new(read_half, LinesCodec::new_with_max_length(max));

    // Closed before sending a header: nothing to do.
    let Some(header) = frames.next().await else {
        return Ok(());
    };
    let header = match header {
        Ok(header) => header,
        Err(LinesCodecError::MaxLineLengthExceeded) => {
            let err = CollectorError::bad_header("header frame too long");
            refuse(&mut write_half, &err).await;
            return Err(err);
        }
        Err(LinesCodecError::Io(err)) => return Err(err.into()),
    };

    let command = match Command::parse(&header) {
        Ok(command) => command,
        Err(err) => {
            refuse(&mut write_half, &err).await;
            return Err(err);
        }
    };

    match command {
        Command::Archive { pea } => match collector.ingest_lines(frames, &pea).await {
            Ok(summary) => {
                debug!(
                    pea = %pea,
                    archived = summary.archived,
                    malformed = summary.malformed,
                    "archive connection done"
                );
                Ok(())
            }
            Err(err) => {
                refuse(&mut write_half, &err).await;
                Err(err)
            }
        },
        Command::Recent { app } => match collector.recent(&app) {
            Ok(lines) => {
                for line in lines {
                    write_line(&mut write_half, &line).await?;
                }
                write_half.shutdown().await?;
                Ok(())
            }
            Err(err) => {
                refuse(&mut write_half, &err).await;
                Err(err)
            }
        },
        Command::Tail { app } => {
            let mut tail = match collector.tail(&app) {
                Ok(tail) => tail,
                Err(err) => {
                    refuse(&mut write_half, &err).await;
                    return Err(err);
                }
            };
            run_tail(&mut tail, frames, &mut write_half, &app).await;
            Ok(())
        }
    }
}

/// Pump a tail out to the client until something ends it
async fn run_tail(
    tail: &mut LogTail,
    mut frames: FramedRead<OwnedReadHalf, LinesCodec>,
    write_half: &mut OwnedWriteHalf,
    app: &AppName,
) {
    loop {
        tokio::select! {
            line = tail.recv() => match line {
                Ok(line) => {
                    if write_line(write_half, &line).await.is_err() {
                        // Client went away mid-write.
                        break;
                    }
                }
                Err(TailError::Overrun(skipped)) => {
                    warn!(app = %app, skipped, "tail subscriber overran, disconnecting");
                    refuse(write_half, &TailError::Overrun(skipped)).await;
                    break;
                }
                Err(TailError::Closed) => break,
            },
            // Any further client activity, including EOF, cancels the tail.
            _ = frames.next() => break,
        }
    }
}

/// Wire shape of an emitted log line: the pea tag, then the text
async fn write_line(write_half: &mut OwnedWriteHalf, line: &LogLine) -> std::io::Result<()> {
    write_half
        .write_all(format!("{}: {}\n", line.pea, line.text).as_bytes())
        .await
}

/// Best-effort single error line back to the client
async fn refuse(write_half: &mut OwnedWriteHalf, err: &(dyn std::fmt::Display + Sync)) {
    let _ = write_half
        .write_all(format!("error: {}\n", err).as_bytes())
        .await;
    let _ = write_half.shutdown().await;
}
