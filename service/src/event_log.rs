//! Append-only event log shared by every ingestion path.
//!
//! Each record is one line, `timestamp - LEVEL - message`, appended to a single file.
//! The file and its parent directory are created on the first write, so constructing
//! an [`EventLog`] never touches the filesystem.

use chrono::Local;
use log::Level;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Directory name used under the per-user log root.
pub const APP_LOG_DIR: &str = "webhook-watchdog";

/// Name of the log file inside [`APP_LOG_DIR`].
pub const LOG_FILE_NAME: &str = "watchdog.log";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Handle to the process' event log file.
///
/// Cloning is cheap and every clone appends to the same file. Writes are serialized
/// through a mutex so lines from concurrent requests never interleave.
#[derive(Clone, Debug)]
pub struct EventLog {
    inner: Arc<Sink>,
}

#[derive(Debug)]
struct Sink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Sink {
                path: path.into(),
                file: Mutex::new(None),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Appends one record to the log file.
    pub fn record(&self, level: Level, message: &str) -> io::Result<()> {
        let line = format_line(&Local::now().format(TIMESTAMP_FORMAT).to_string(), level, message);
        self.write_line(&line)
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut guard = self
            .inner
            .file
            .lock()
            .map_err(|_| io::Error::other("event log mutex poisoned"))?;

        if guard.is_none() {
            *guard = Some(open_append(&self.inner.path)?);
        }

        // Checked just above
        let file = guard.as_mut().ok_or_else(|| io::Error::other("event log not open"))?;
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

/// Renders a single record. Embedded newlines are escaped so one record stays one line.
fn format_line(timestamp: &str, level: Level, message: &str) -> String {
    let message = message.replace('\r', "\\r").replace('\n', "\\n");
    format!("{timestamp} - {level} - {message}\n")
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Location of the log file in the current user's log directory.
///
/// macOS uses `~/Library/Logs/webhook-watchdog/`, other platforms
/// `~/.local/state/webhook-watchdog/logs/`.
pub fn default_log_path() -> PathBuf {
    #[allow(deprecated)]
    let home = std::env::home_dir().unwrap_or_else(std::env::temp_dir);
    user_log_dir(&home).join(LOG_FILE_NAME)
}

#[cfg(target_os = "macos")]
fn user_log_dir(home: &Path) -> PathBuf {
    home.join("Library").join("Logs").join(APP_LOG_DIR)
}

#[cfg(not(target_os = "macos"))]
fn user_log_dir(home: &Path) -> PathBuf {
    home.join(".local")
        .join("state")
        .join(APP_LOG_DIR)
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_file_is_created_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("watchdog.log");
        let event_log = EventLog::new(&path);

        assert!(!path.exists(), "constructing the log must not create it");

        event_log.record(Level::Info, "first record").unwrap();

        assert!(path.exists());
        assert_eq!(event_log.path(), path.as_path());
    }

    #[test]
    fn test_record_line_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchdog.log");
        let event_log = EventLog::new(&path);

        event_log.record(Level::Error, "something broke").unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 1);
        let parts: Vec<&str> = lines[0].splitn(3, " - ").collect();
        assert_eq!(parts.len(), 3);
        assert!(chrono::NaiveDateTime::parse_from_str(parts[0], TIMESTAMP_FORMAT).is_ok());
        assert_eq!(parts[1], "ERROR");
        assert_eq!(parts[2], "something broke");
    }

    #[test]
    fn test_multiline_messages_stay_on_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchdog.log");
        let event_log = EventLog::new(&path);

        event_log.record(Level::Info, "line one\nline two").unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("line one\\nline two"));
    }

    #[test]
    fn test_existing_file_is_appended_to() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchdog.log");

        EventLog::new(&path).record(Level::Info, "from first process").unwrap();
        EventLog::new(&path).record(Level::Info, "from second process").unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("from first process"));
        assert!(lines[1].ends_with("from second process"));
    }

    #[test]
    fn test_concurrent_records_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchdog.log");
        let event_log = EventLog::new(&path);

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let event_log = event_log.clone();
                thread::spawn(move || {
                    for n in 0..50 {
                        event_log
                            .record(Level::Info, &format!("worker {worker} record {n}"))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 400);
        assert!(lines
            .iter()
            .all(|line| line.contains(" - INFO - worker ") && line.matches(" - ").count() == 2));
    }

    #[test]
    fn test_default_path_is_per_user() {
        let path = default_log_path();
        assert!(path.ends_with(Path::new(APP_LOG_DIR).join(LOG_FILE_NAME))
            || path.ends_with(Path::new(APP_LOG_DIR).join("logs").join(LOG_FILE_NAME)));
        assert!(path.is_absolute() || path.starts_with(std::env::temp_dir()));
    }
}
