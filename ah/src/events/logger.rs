//! Event Logger - persists relayed events to a JSONL file
//!
//! The EventLogger subscribes to the coordinator and appends every relayed
//! event as one JSON line, for history, debugging and replay.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use super::types::{AnchorEvent, EventLogEntry};
use crate::coordinator::Coordinator;

/// Event logger that appends events to a JSONL file
pub struct EventLogger {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl EventLogger {
    /// Create a new event logger; the file is opened on the first write
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        debug!(?path, "EventLogger::new: creating logger");
        Self { path, writer: None }
    }

    /// Create a logger writing to the default location
    /// (`<data dir>/anchorhub/events.jsonl`)
    pub fn with_default_path() -> eyre::Result<Self> {
        Ok(Self::new(default_log_path()?))
    }

    fn writer(&mut self) -> eyre::Result<&mut BufWriter<File>> {
        if self.writer.is_none() {
            if let Some(parent) = self.path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            debug!(path = ?self.path, "EventLogger: opening log file");
            let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
            self.writer = Some(BufWriter::new(file));
        }
        self.writer
            .as_mut()
            .ok_or_else(|| eyre::eyre!("Event log writer unavailable"))
    }

    /// Append one event as a JSON line
    pub fn write_event(&mut self, event: &AnchorEvent) -> eyre::Result<()> {
        debug!(event_type = event.event_type(), "EventLogger::write_event");
        let entry = EventLogEntry::new(event.clone());
        let json = serde_json::to_string(&entry)?;
        let writer = self.writer()?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;
        Ok(())
    }

    /// Consume events until the coordinator's bus closes
    ///
    /// This is meant to be spawned as a background task.
    pub async fn run(mut self, mut rx: broadcast::Receiver<AnchorEvent>) {
        debug!("EventLogger::run: starting event logger");

        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = self.write_event(&event) {
                        error!(event_type = event.event_type(), error = %e, "EventLogger: failed to write event");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "EventLogger: lagged behind, missed events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("EventLogger: channel closed, shutting down");
                    break;
                }
            }
        }

        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

fn default_log_path() -> eyre::Result<PathBuf> {
    let data_dir = dirs::data_local_dir().ok_or_else(|| eyre::eyre!("Could not determine data directory"))?;
    Ok(data_dir.join("anchorhub").join("events.jsonl"))
}

/// Read all entries from an event log file
///
/// Unparseable lines are skipped with a warning; a missing file reads as empty.
pub fn read_events(path: impl AsRef<Path>) -> eyre::Result<Vec<EventLogEntry>> {
    let path = path.as_ref();
    debug!(?path, "read_events: reading log file");

    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    let mut entries = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<EventLogEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!(line, error = %e, "read_events: failed to parse line");
            }
        }
    }

    debug!(count = entries.len(), "read_events: loaded entries");
    Ok(entries)
}

/// Spawn an event logger for `coordinator` as a background task
///
/// Subscribes immediately, so every event relayed after this call is logged.
pub fn spawn_event_logger(
    coordinator: &Coordinator,
    path: Option<PathBuf>,
) -> eyre::Result<tokio::task::JoinHandle<()>> {
    let logger = match path {
        Some(path) => EventLogger::new(path),
        None => EventLogger::with_default_path()?,
    };
    let rx = coordinator.subscribe();
    Ok(tokio::spawn(async move {
        logger.run(rx).await;
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnchorHandle, AnchorId};
    use tempfile::tempdir;

    #[test]
    fn test_event_logger_is_lazy() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("events.jsonl");
        let logger = EventLogger::new(&path);
        assert!(logger.writer.is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_write_event_creates_parent_dirs() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("session").join("events.jsonl");
        let mut logger = EventLogger::new(&path);

        logger.write_event(&AnchorEvent::SessionStarted).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("SessionStarted"));
    }

    #[test]
    fn test_read_events_round_trip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("events.jsonl");
        let mut logger = EventLogger::new(&path);

        let id = AnchorId::new();
        logger.write_event(&AnchorEvent::CreateStarted).unwrap();
        logger
            .write_event(&AnchorEvent::CreateSucceeded {
                id,
                handle: AnchorHandle::new(1),
            })
            .unwrap();

        let entries = read_events(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event.event_type(), "CreateStarted");
        assert_eq!(entries[1].event.anchor_id(), Some(id));
    }

    #[test]
    fn test_read_events_skips_garbage() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("events.jsonl");
        let mut logger = EventLogger::new(&path);
        logger.write_event(&AnchorEvent::FindStarted).unwrap();
        drop(logger);

        let mut content = fs::read_to_string(&path).unwrap();
        content.push_str("not json\n\n");
        fs::write(&path, content).unwrap();

        let entries = read_events(&path).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_read_missing_file() {
        let temp = tempdir().unwrap();
        let entries = read_events(temp.path().join("missing.jsonl")).unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_run_drains_until_closed() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("events.jsonl");
        let (tx, rx) = broadcast::channel(16);

        let task = tokio::spawn(EventLogger::new(&path).run(rx));
        tx.send(AnchorEvent::SessionInitialized).unwrap();
        tx.send(AnchorEvent::SessionEnded).unwrap();
        drop(tx);
        task.await.unwrap();

        let entries = read_events(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].event, AnchorEvent::SessionEnded);
    }
}
