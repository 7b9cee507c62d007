//! Append-only JSONL event log.
//!
//! One [`EventRecord`] per line, each line decodable on its own. Appends
//! hold an async writer lock and run on the blocking pool, so concurrent
//! callers never interleave and a slow disk never stalls a runtime worker.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::models::EventRecord;
use crate::error::RelayError;

/// Single-writer append-only event log backed by a local file.
///
/// The file is reopened for every append, so a log that was removed or
/// rotated since the last write is recreated rather than written into an
/// unlinked inode. Missing parent directories are created when the open
/// reports them absent.
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    fsync: bool,
    writer: Mutex<()>,
}

impl EventLog {
    /// Creates a log that will write to `path`. Nothing touches the
    /// filesystem until the first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fsync: false,
            writer: Mutex::new(()),
        }
    }

    /// Enables or disables `sync_data` after every append.
    #[must_use]
    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }

    /// Returns the log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Builds a new record and appends it as one line.
    ///
    /// Resolves once the line has been handed to the OS (and synced, if
    /// fsync is enabled). A write that fails partway is cut back so the
    /// file never keeps a torn line.
    ///
    /// # Errors
    ///
    /// - [`RelayError::Serialization`] if `payload` or `context` cannot be
    ///   encoded as JSON.
    /// - [`RelayError::Persistence`] if the directory or file cannot be
    ///   created or written.
    /// - [`RelayError::Internal`] if the blocking write task fails.
    pub async fn append<P, C>(
        &self,
        event_type: &str,
        payload: &P,
        context: &C,
    ) -> Result<EventRecord, RelayError>
    where
        P: Serialize + ?Sized,
        C: Serialize + ?Sized,
    {
        let record = EventRecord {
            id: Uuid::new_v4(),
            event_type: event_type.to_string(),
            timestamp: Utc::now(),
            payload: serde_json::to_value(payload)?,
            context: serde_json::to_value(context)?,
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _writer = self.writer.lock().await;
        let path = self.path.clone();
        let fsync = self.fsync;
        tokio::task::spawn_blocking(move || write_line(&path, line.as_bytes(), fsync))
            .await
            .map_err(|e| RelayError::Internal(format!("event log writer task failed: {e}")))??;

        tracing::info!(id = %record.id, event_type, "event embedded");
        Ok(record)
    }

    /// Reads and decodes every record in the log, oldest first.
    ///
    /// A missing file reads as an empty log.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Persistence`] if the file exists but cannot be
    /// read, or [`RelayError::Serialization`] if a line is not a valid
    /// record.
    pub fn read_all(&self) -> Result<Vec<EventRecord>, RelayError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(RelayError::from))
            .collect()
    }
}

/// Sink that can report its length and be cut back to an earlier one.
trait LineSink: Write {
    fn current_len(&mut self) -> io::Result<u64>;
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl LineSink for File {
    fn current_len(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

fn write_line(path: &Path, line: &[u8], fsync: bool) -> io::Result<()> {
    let mut file = open_for_append(path)?;
    append_whole_line(&mut file, line)?;
    if fsync {
        file.sync_data()?;
    }
    Ok(())
}

/// Writes `line` in full or not at all.
fn append_whole_line<S: LineSink>(sink: &mut S, line: &[u8]) -> io::Result<()> {
    let start = sink.current_len()?;
    if let Err(e) = sink.write_all(line) {
        if let Err(rollback) = sink.truncate_to(start) {
            tracing::error!(error = %rollback, "could not cut back partial event log line");
        }
        return Err(e);
    }
    Ok(())
}

fn open_for_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    match options.open(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if let Some(dir) = path.parent()
                && !dir.as_os_str().is_empty()
            {
                fs::create_dir_all(dir)?;
                tracing::debug!(dir = %dir.display(), "event log directory created");
            }
            options.open(path)
        }
        opened => opened,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::persistence::models::{CommandContext, EMIT_EVENT_TYPE};

    fn context() -> CommandContext {
        CommandContext {
            source: "test_server".to_string(),
            command: "/deploy".to_string(),
        }
    }

    /// In-memory sink that runs out of space after `capacity` bytes.
    struct ShortDisk {
        data: Vec<u8>,
        capacity: usize,
    }

    impl Write for ShortDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.capacity.saturating_sub(self.data.len());
            if room == 0 {
                return Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"));
            }
            let n = room.min(buf.len());
            self.data.extend(buf.iter().take(n));
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LineSink for ShortDisk {
        fn current_len(&mut self) -> io::Result<u64> {
            Ok(self.data.len() as u64)
        }

        fn truncate_to(&mut self, len: u64) -> io::Result<()> {
            self.data.truncate(usize::try_from(len).unwrap_or(usize::MAX));
            Ok(())
        }
    }

    #[test]
    fn does_not_touch_disk_until_first_append() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("nested").join("log.jsonl");
        let _log = EventLog::new(&path);
        assert!(!dir.path().join("nested").exists());
    }

    #[tokio::test]
    async fn append_creates_missing_directories() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("a").join("b").join("event_log.jsonl");
        let log = EventLog::new(&path);

        let result = log
            .append(EMIT_EVENT_TYPE, &serde_json::json!({ "n": 1 }), &context())
            .await;
        assert!(result.is_ok());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn n_appends_yield_n_distinct_parseable_lines() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let log = EventLog::new(dir.path().join("event_log.jsonl")).with_fsync(true);

        for n in 0..5 {
            let Ok(_) = log
                .append(EMIT_EVENT_TYPE, &serde_json::json!({ "n": n }), &context())
                .await
            else {
                panic!("append {n} failed");
            };
        }

        let Ok(raw) = fs::read_to_string(log.path()) else {
            panic!("read failed");
        };
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(raw.ends_with('\n'));

        let mut ids = HashSet::new();
        for line in &lines {
            let Ok(record) = serde_json::from_str::<EventRecord>(line) else {
                panic!("line did not decode: {line}");
            };
            assert_eq!(record.event_type, "emit");
            assert_eq!(
                record.context,
                serde_json::json!({ "source": "test_server", "command": "/deploy" })
            );
            ids.insert(record.id);
        }
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn appends_to_existing_file() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("event_log.jsonl");
        let _ = EventLog::new(&path).append("emit", &1, &context()).await;
        let second = EventLog::new(&path);
        let _ = second.append("emit", &2, &context()).await;

        let Ok(records) = second.read_all() else {
            panic!("read_all failed");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records.first().map(|r| r.payload.clone()), Some(serde_json::json!(1)));
    }

    #[tokio::test]
    async fn append_after_directory_removed_recreates_log() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let out = dir.path().join("out");
        let log = EventLog::new(out.join("event_log.jsonl"));
        let Ok(_) = log.append("emit", &1, &context()).await else {
            panic!("first append failed");
        };

        let Ok(()) = fs::remove_dir_all(&out) else {
            panic!("remove output dir");
        };
        let Ok(second) = log.append("emit", &2, &context()).await else {
            panic!("append after removal failed");
        };

        let Ok(records) = log.read_all() else {
            panic!("read_all failed");
        };
        assert_eq!(records, vec![second]);
    }

    #[tokio::test]
    async fn append_after_rotation_writes_fresh_file() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("event_log.jsonl");
        let rotated = dir.path().join("event_log.jsonl.1");
        let log = EventLog::new(&path);
        let _ = log.append("emit", &1, &context()).await;

        let Ok(()) = fs::rename(&path, &rotated) else {
            panic!("rotate");
        };
        let _ = log.append("emit", &2, &context()).await;

        let Ok(records) = log.read_all() else {
            panic!("read_all failed");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records.first().map(|r| r.payload.clone()), Some(serde_json::json!(2)));
        let rotated_lines = fs::read_to_string(&rotated).map(|s| s.lines().count());
        assert_eq!(rotated_lines.ok(), Some(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_never_interleave() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let log = Arc::new(EventLog::new(dir.path().join("event_log.jsonl")));

        let mut tasks = Vec::new();
        for n in 0..20 {
            let log = Arc::clone(&log);
            tasks.push(tokio::spawn(async move {
                log.append("emit", &serde_json::json!({ "n": n }), &context())
                    .await
                    .is_ok()
            }));
        }
        for task in tasks {
            assert!(matches!(task.await, Ok(true)));
        }

        let Ok(records) = log.read_all() else {
            panic!("every line should decode on its own");
        };
        assert_eq!(records.len(), 20);
        let ids: HashSet<_> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn failed_write_leaves_no_partial_line() {
        let mut disk = ShortDisk {
            data: b"{\"ok\":1}\n".to_vec(),
            capacity: 16,
        };

        let result = append_whole_line(&mut disk, b"{\"too\":\"long for the disk\"}\n");
        assert!(matches!(result, Err(e) if e.kind() == io::ErrorKind::StorageFull));
        assert_eq!(disk.data, b"{\"ok\":1}\n".to_vec());

        disk.capacity = 64;
        assert!(append_whole_line(&mut disk, b"{\"n\":2}\n").is_ok());
        assert_eq!(disk.data, b"{\"ok\":1}\n{\"n\":2}\n".to_vec());
    }

    #[tokio::test]
    async fn unwritable_path_is_persistence_error() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let blocker = dir.path().join("blocker");
        let Ok(()) = fs::write(&blocker, b"not a directory") else {
            panic!("write blocker");
        };
        let log = EventLog::new(blocker.join("event_log.jsonl"));

        let result = log.append("emit", &serde_json::json!({}), &context()).await;
        assert!(matches!(result, Err(RelayError::Persistence(_))));
    }

    #[test]
    fn read_all_on_missing_file_is_empty() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let log = EventLog::new(dir.path().join("missing.jsonl"));
        assert!(log.read_all().is_ok_and(|records| records.is_empty()));
    }
}
