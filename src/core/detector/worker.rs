//! Background detection worker.
//!
//! Lifecycle: `Idle --start--> Running --stop or first detection-->
//! Stopping --worker exit--> Idle`. `start` while running is ignored with a
//! warning; `stop` is idempotent and waits for the in-flight pass. A
//! deadlock is persistent by construction, so the worker reports the first
//! positive result once and terminates itself, leaving the program in an
//! observable deadlocked state.

use crate::core::detector::Detector;
use crossbeam_channel::{RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

/// Default detection cadence in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 1;

/// Lifecycle state of the background worker
pub(crate) struct Worker {
    /// Gate for the main loop; cleared by `stop` and on worker exit
    running: AtomicBool,
    /// One-shot flag so a deadlock is reported exactly once per run
    deadlock_detected: AtomicBool,
    /// Detection cadence in seconds; re-read before every sleep
    interval_secs: AtomicU64,
    /// Shutdown channel and join handle of the current worker, if any
    control: Mutex<Option<WorkerHandle>>,
}

struct WorkerHandle {
    shutdown_tx: Sender<()>,
    join: JoinHandle<()>,
}

impl Worker {
    pub fn new() -> Self {
        Worker {
            running: AtomicBool::new(false),
            deadlock_detected: AtomicBool::new(false),
            interval_secs: AtomicU64::new(DEFAULT_INTERVAL_SECS),
            control: Mutex::new(None),
        }
    }
}

impl Detector {
    /// Start the background detection worker
    ///
    /// `interval_secs` is clamped to at least one second. Calling while a
    /// worker is already running is ignored with a warning.
    pub fn start(&'static self, interval_secs: u64) {
        if self.worker.running.swap(true, Ordering::SeqCst) {
            log::warn!("deadlock detector is already running, start ignored");
            return;
        }

        // Reap a worker that terminated itself after a detection
        if let Some(stale) = self.worker.control.lock().take() {
            let _ = stale.join.join();
        }

        self.set_interval(interval_secs);
        self.worker.deadlock_detected.store(false, Ordering::SeqCst);

        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let join = std::thread::Builder::new()
            .name("lockwatch-detector".into())
            .spawn(move || {
                log::info!(
                    "detector worker started, checking every {} second(s)",
                    self.worker.interval_secs.load(Ordering::SeqCst)
                );

                while self.worker.running.load(Ordering::SeqCst) {
                    let interval =
                        Duration::from_secs(self.worker.interval_secs.load(Ordering::SeqCst));
                    // The interruptible interval sleep: a shutdown signal or
                    // a dropped sender ends the loop without waiting out the
                    // full interval
                    match shutdown_rx.recv_timeout(interval) {
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {}
                    }

                    if let Some(cycle) = self.run_detection_pass() {
                        if !self.worker.deadlock_detected.swap(true, Ordering::SeqCst) {
                            self.handle_detected_deadlock(cycle);
                        }
                        break;
                    }
                }

                self.worker.running.store(false, Ordering::SeqCst);
                log::info!("detector worker stopped");
            })
            .expect("failed to spawn detector worker thread");

        *self.worker.control.lock() = Some(WorkerHandle { shutdown_tx, join });
    }

    /// Stop the background detection worker and join it
    ///
    /// Idempotent; waits for the current pass to complete. Also reaps a
    /// worker that already terminated itself after reporting.
    pub fn stop(&self) {
        let handle = self.worker.control.lock().take();
        if let Some(handle) = handle {
            self.worker.running.store(false, Ordering::SeqCst);
            // Wake the interval sleep; fails harmlessly if the worker
            // already exited
            let _ = handle.shutdown_tx.try_send(());
            let _ = handle.join.join();
        }
    }

    /// Whether the background worker is currently running
    pub fn is_running(&self) -> bool {
        self.worker.running.load(Ordering::SeqCst)
    }

    /// Whether a deadlock has been reported in the current run
    pub fn deadlock_detected(&self) -> bool {
        self.worker.deadlock_detected.load(Ordering::SeqCst)
    }

    /// Update the detection interval; takes effect on the next sleep
    pub fn set_interval(&self, interval_secs: u64) {
        let interval_secs = if interval_secs == 0 {
            log::warn!("detection interval must be at least 1 second, clamping");
            1
        } else {
            interval_secs
        };
        self.worker.interval_secs.store(interval_secs, Ordering::SeqCst);
    }
}
