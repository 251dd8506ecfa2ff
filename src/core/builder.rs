use crate::core::detector::{DEFAULT_INTERVAL_SECS, detector};
use crate::core::logger;
use crate::core::types::DeadlockInfo;
use anyhow::Result;
use std::path::PathBuf;

/// Entry point for configuring and starting the detector
///
/// # Example
///
/// ```rust,no_run
/// use lockwatch::Lockwatch;
///
/// Lockwatch::new()
///     .interval_secs(1)
///     .callback(|info| {
///         println!("Deadlock detected! Cycle: {:?}", info.thread_cycle);
///     })
///     .start()
///     .expect("Failed to initialize detector");
/// ```
pub struct Lockwatch {
    interval_secs: u64,
    log_path: Option<PathBuf>,
    callback: Option<Box<dyn Fn(DeadlockInfo) + Send + Sync + 'static>>,
}

impl Default for Lockwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Lockwatch {
    /// Begin configuring the detector
    pub fn new() -> Self {
        Lockwatch {
            interval_secs: DEFAULT_INTERVAL_SECS,
            log_path: None,
            callback: None,
        }
    }

    /// Set the background detection interval in seconds (minimum 1)
    pub fn interval_secs(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    /// Record every observed lock event to a JSON-lines file
    pub fn with_log<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Set the function invoked (on a dedicated thread) when a deadlock is
    /// detected
    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(DeadlockInfo) + Send + Sync + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Initialize the global detector and start background detection
    pub fn start(self) -> Result<()> {
        if let Some(path) = self.log_path {
            logger::init_with_file(path)?;
        }
        if let Some(callback) = self.callback {
            detector().set_deadlock_callback(callback);
        }
        detector().start(self.interval_secs);
        Ok(())
    }
}
