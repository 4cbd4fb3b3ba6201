//! Run activity log
//!
//! Append-only, ordered list of timestamped entries. Every entry is echoed
//! through `tracing` as it is recorded and the whole list is written to the
//! workflow report at the end of the run. Clones share the same list.

use chrono::{DateTime, Local};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// Marker that starts every failure entry
pub const ERROR_MARKER: &str = "ERROR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl LogEntry {
    pub fn is_error(&self) -> bool {
        self.message.starts_with(ERROR_MARKER)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.message
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and echo it
    pub fn record(&self, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp: Local::now(),
            message: message.into(),
        };

        if entry.is_error() {
            warn!("{}", entry);
        } else {
            info!("{}", entry);
        }

        self.lock().push(entry);
    }

    /// Append a failure entry (`ERROR <message>`)
    pub fn error(&self, message: impl fmt::Display) {
        self.record(format!("{} {}", ERROR_MARKER, message));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of all entries in append order
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<LogEntry> {
        self.lock().last().cloned()
    }

    // A poisoned lock still holds a consistent Vec: pushes are the only writes.
    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_order() {
        let log = ActivityLog::new();
        log.record("first");
        log.record("second");
        log.error("downloading x: boom");

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[1].message, "second");
        assert_eq!(entries[2].message, "ERROR downloading x: boom");
        assert!(entries[2].is_error());
        assert!(!entries[0].is_error());
    }

    #[test]
    fn test_clones_share_entries() {
        let log = ActivityLog::new();
        let other = log.clone();
        other.record("from clone");

        assert_eq!(log.len(), 1);
        assert_eq!(log.last().unwrap().message, "from clone");
    }

    #[test]
    fn test_display_format() {
        let log = ActivityLog::new();
        log.record("Downloaded image: a.jpg");

        let line = log.last().unwrap().to_string();
        // [YYYY-MM-DD HH:MM:SS] message
        assert!(line.starts_with('['));
        assert_eq!(&line[20..22], "] ");
        assert!(line.ends_with("Downloaded image: a.jpg"));
    }
}
