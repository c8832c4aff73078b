//! JSON-lines event log written by a background task.
//!
//! Records are handed over through an unbounded channel so the game loop never
//! waits on the file; one JSON object per line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use blockfall_core::LockEvent;
use blockfall_types::{GameCommand, GameStatus};

/// One line of the event log
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventRecord {
    SessionStarted {
        seed: u32,
    },
    Command {
        command: GameCommand,
        applied: bool,
    },
    Lock(LockEvent),
    Status {
        status: GameStatus,
    },
    SessionEnded {
        score: u32,
        lines: u32,
        level: u32,
        pieces: u32,
    },
}

/// Handle to the writer task
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    tx: mpsc::UnboundedSender<EventRecord>,
    writer: JoinHandle<()>,
}

impl EventLog {
    /// Open `path` for appending and start the writer task.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("failed to open event log {}", path.display()))?;

        let (tx, mut rx) = mpsc::unbounded_channel::<EventRecord>();
        let log_path = path.clone();
        let writer = tokio::spawn(async move {
            let mut file = file;
            let mut buf: Vec<u8> = Vec::with_capacity(512);

            while let Some(record) = rx.recv().await {
                buf.clear();
                if let Err(e) = serde_json::to_writer(&mut buf, &record) {
                    eprintln!("[Engine] event log: cannot encode {:?}: {}", record, e);
                    continue;
                }
                buf.push(b'\n');
                if let Err(e) = file.write_all(&buf).await {
                    eprintln!("[Engine] event log {} write failed: {}", log_path.display(), e);
                    break;
                }
            }

            let _ = file.flush().await;
        });

        Ok(Self { path, tx, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queue a record; dropped silently once the writer has stopped.
    pub fn record(&self, record: EventRecord) {
        let _ = self.tx.send(record);
    }

    /// Flush everything queued so far and stop the writer.
    pub async fn close(self) -> Result<()> {
        drop(self.tx);
        self.writer.await.context("event log writer panicked")
    }
}
