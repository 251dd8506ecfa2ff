//! Optional JSON-lines event log.
//!
//! When configured with a file path, every hook observation (attempt,
//! acquired, released) is appended as one JSON object per line, and the
//! terminal deadlock record is appended when the background worker reports.
//! Logging is best-effort: write failures are swallowed so the hooks never
//! perturb the instrumented program.

use crate::core::types::{DeadlockInfo, LockEvent, LockId, ThreadId};
use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Structure for a single log entry
#[derive(Debug, Serialize)]
pub struct LogEntry {
    /// Thread that performed the action
    pub thread_id: ThreadId,
    /// Lock that was involved
    pub lock_id: LockId,
    /// Type of event that occurred
    pub event: LockEvent,
    /// Seconds since the Unix epoch, microsecond precision
    pub timestamp: f64,
}

/// Terminal record appended when a deadlock is reported
#[derive(Debug, Serialize)]
struct DeadlockRecord<'a> {
    deadlock: &'a DeadlockInfo,
}

/// Determines how the logger should operate
#[derive(Debug)]
enum LoggerMode {
    /// Logging is disabled entirely
    Disabled,
    /// Log to the specified file
    ToFile(File),
}

/// Logger for recording lock events
pub struct EventLogger {
    mode: LoggerMode,
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLogger {
    /// Create a new logger with logging disabled
    pub fn new() -> Self {
        EventLogger {
            mode: LoggerMode::Disabled,
        }
    }

    /// Create a new logger that appends to the specified file
    pub fn with_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .context("Failed to open log file")?;

        Ok(EventLogger {
            mode: LoggerMode::ToFile(file),
        })
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        !matches!(self.mode, LoggerMode::Disabled)
    }

    /// Log a lock event based on the configured mode
    pub fn log_event(&self, thread_id: ThreadId, lock_id: LockId, event: LockEvent) {
        if let LoggerMode::Disabled = self.mode {
            return;
        }

        let now = Utc::now();
        let timestamp = now.timestamp() as f64 + now.timestamp_subsec_micros() as f64 / 1_000_000.0;

        let entry = LogEntry {
            thread_id,
            lock_id,
            event,
            timestamp,
        };
        self.write_line(&entry);
    }

    /// Append the terminal deadlock record
    pub fn log_deadlock(&self, info: &DeadlockInfo) {
        if let LoggerMode::Disabled = self.mode {
            return;
        }
        self.write_line(&DeadlockRecord { deadlock: info });
    }

    fn write_line<T: Serialize>(&self, value: &T) {
        if let LoggerMode::ToFile(ref file) = self.mode {
            let mut file = file;
            if let Ok(json) = serde_json::to_string(value) {
                let _ = writeln!(file, "{json}");
                let _ = file.flush();
            }
        }
    }
}

// Global logger instance, disabled until the builder or FFI installs a file
lazy_static::lazy_static! {
    static ref GLOBAL_LOGGER: Mutex<EventLogger> = Mutex::new(EventLogger::new());
}

/// Route all subsequent hook events to `path`
pub fn init_with_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let logger = EventLogger::with_file(path)?;
    *GLOBAL_LOGGER.lock() = logger;
    Ok(())
}

/// Log a lock event through the global logger
pub fn log_event(thread_id: ThreadId, lock_id: LockId, event: LockEvent) {
    GLOBAL_LOGGER.lock().log_event(thread_id, lock_id, event);
}

/// Log the terminal deadlock record through the global logger
pub fn log_deadlock(info: &DeadlockInfo) {
    GLOBAL_LOGGER.lock().log_deadlock(info);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn disabled_logger_writes_nothing() {
        let logger = EventLogger::new();
        assert!(!logger.is_enabled());
        logger.log_event(1, 10, LockEvent::Attempt);
    }

    #[test]
    fn file_logger_appends_json_lines() {
        let path = std::env::temp_dir().join("lockwatch_logger_test.log");
        let _ = fs::remove_file(&path);

        let logger = EventLogger::with_file(&path).unwrap();
        assert!(logger.is_enabled());
        logger.log_event(1, 10, LockEvent::Attempt);
        logger.log_event(1, 10, LockEvent::Acquired);
        logger.log_deadlock(&DeadlockInfo {
            thread_cycle: vec![1, 2],
            thread_waiting_for_locks: vec![(1, 10), (2, 11)],
            timestamp: Utc::now().to_rfc3339(),
        });

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("\"Attempt\""));
        assert!(lines[1].contains("\"Acquired\""));
        assert!(lines[2].contains("\"deadlock\""));
        for line in lines {
            serde_json::from_str::<serde_json::Value>(line).unwrap();
        }

        let _ = fs::remove_file(&path);
    }
}
