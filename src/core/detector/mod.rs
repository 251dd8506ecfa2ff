pub mod hooks;
mod report;
mod worker;

pub use worker::DEFAULT_INTERVAL_SECS;

use crate::core::graph::WaitForGraph;
use crate::core::logger;
use crate::core::tables::StateTables;
use crate::core::types::{DeadlockInfo, LockId, ThreadId};
use chrono::Utc;
use crossbeam_channel::{Sender, unbounded};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use worker::Worker;

// Global dispatcher for asynchronous deadlock callback execution.
// Ensures callbacks can execute even when every instrumented thread
// is deadlocked.
lazy_static::lazy_static! {
    static ref DISPATCHER: Dispatcher = Dispatcher::new();
}

/// Global storage for the deadlock callback function
static CALLBACK: OnceLock<Arc<dyn Fn(DeadlockInfo) + Send + Sync>> = OnceLock::new();

/// Background dispatcher for asynchronous callback execution
///
/// Runs a dedicated thread that receives deadlock events through a channel
/// and executes the registered callback, so reporting never blocks the
/// detection worker.
struct Dispatcher {
    /// Channel sender for transmitting deadlock events
    sender: Sender<DeadlockInfo>,
    /// Background thread handle
    _thread_handle: std::thread::JoinHandle<()>,
}

impl Dispatcher {
    fn new() -> Self {
        let (tx, rx) = unbounded::<DeadlockInfo>();

        let thread_handle = std::thread::spawn(move || {
            while let Ok(info) = rx.recv() {
                if let Some(cb) = CALLBACK.get() {
                    cb(info);
                }
            }
        });

        Dispatcher {
            sender: tx,
            _thread_handle: thread_handle,
        }
    }

    /// Send deadlock info to the background thread for callback execution
    fn send(&self, info: DeadlockInfo) {
        let _ = self.sender.send(info);
    }
}

/// Runtime deadlock detector
///
/// Maintains the three observation tables mutated by the hooks, the
/// wait-for graph rebuilt on each detection pass, and the background
/// worker's lifecycle state.
///
/// # How it works
///
/// 1. Instrumented lock operations drive the hooks, which keep the
///    holders/waiters/contexts tables current.
/// 2. A detection pass atomically snapshots the tables and derives the
///    wait-for graph: an edge `a -> b` for every thread `a` blocked on a
///    lock held by thread `b`.
/// 3. Kahn's topological reduction decides cycle presence; a cycle is a
///    deadlock, since every lock has a single holder and no blocked thread
///    can be unilaterally unblocked.
/// 4. The background worker repeats this at the configured interval and
///    reports the first confirmed deadlock, once.
///
/// The detector is intrinsically process-global: it must observe every
/// instrumented lock in the program. The single instance lives behind
/// [`detector()`]; it is created at first use and its worker is shut down
/// on drop.
pub struct Detector {
    /// Observation tables, one mutex per table
    tables: StateTables,
    /// Wait-for graph; its mutex is held for the duration of a detection pass
    graph: Mutex<WaitForGraph>,
    /// Background worker lifecycle state
    worker: Worker,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector {
    /// Create a new deadlock detector with empty tables
    pub fn new() -> Self {
        Detector {
            tables: StateTables::new(),
            graph: Mutex::new(WaitForGraph::new()),
            worker: Worker::new(),
        }
    }

    /// Set the callback to be invoked when a deadlock is detected
    ///
    /// The callback runs on a dedicated dispatcher thread. Only the first
    /// registration takes effect.
    pub fn set_deadlock_callback<F>(&self, callback: F)
    where
        F: Fn(DeadlockInfo) + Send + Sync + 'static,
    {
        let cb: Arc<dyn Fn(DeadlockInfo) + Send + Sync> = Arc::new(callback);
        CALLBACK.set(cb).ok();
    }

    /// One-shot synchronous detection pass
    ///
    /// Snapshots the tables, rebuilds the wait-for graph, and tests it for
    /// a cycle. Never blocks instrumented threads longer than the snapshot
    /// copy takes.
    pub fn check_deadlock(&self) -> bool {
        self.run_detection_pass().is_some()
    }

    /// Run one detection pass; returns the cycle participants if any
    ///
    /// Holds the graph mutex for the whole pass. Waiters whose awaited lock
    /// has no holder in the snapshot contribute no edge: the holder may
    /// have released between the waiter's observation and the snapshot, and
    /// such transient states cannot be part of a cycle.
    pub(crate) fn run_detection_pass(&self) -> Option<Vec<ThreadId>> {
        let mut graph = self.graph.lock();
        let snapshot = self.tables.snapshot();

        graph.clear();
        for (&waiting_thread, &requested_lock) in &snapshot.waiters {
            if let Some(&owner_thread) = snapshot.holders.get(&requested_lock) {
                graph.add_edge(waiting_thread, owner_thread);
            }
        }

        if graph.has_cycle() {
            Some(graph.cycle_participants())
        } else {
            None
        }
    }

    /// Cycle participants found by the most recent detection pass, sorted
    ///
    /// Empty when the last pass found no cycle (or none has run yet).
    pub fn cycle_participants(&self) -> Vec<ThreadId> {
        self.graph.lock().cycle_participants()
    }

    /// Build the one-shot report and hand it to the reporter, callback, and log
    pub(crate) fn handle_detected_deadlock(&self, cycle: Vec<ThreadId>) {
        let snapshot = self.tables.snapshot();
        let mut waiting: Vec<(ThreadId, LockId)> = snapshot
            .waiters
            .iter()
            .map(|(&thread_id, &lock_id)| (thread_id, lock_id))
            .collect();
        waiting.sort_unstable();

        let info = DeadlockInfo {
            thread_cycle: cycle,
            thread_waiting_for_locks: waiting,
            timestamp: Utc::now().to_rfc3339(),
        };

        // Dispatch the callback asynchronously and write the terminal
        // record to the event log if enabled
        DISPATCHER.send(info.clone());
        logger::log_deadlock(&info);

        log::error!(
            "deadlock detected: threads {:?} are waiting in a cycle",
            info.thread_cycle
        );
        self.print_deadlock_info();
    }
}

impl Drop for Detector {
    fn drop(&mut self) {
        // A detached worker must not outlive the tables it reads
        self.stop();
    }
}

// The single process-wide detector instance, created at first use
lazy_static::lazy_static! {
    static ref GLOBAL_DETECTOR: Detector = Detector::new();
}

/// Access the process-global detector
pub fn detector() -> &'static Detector {
    &GLOBAL_DETECTOR
}

/// Begin background detection on the global detector
pub fn start(interval_secs: u64) {
    detector().start(interval_secs);
}

/// End background detection on the global detector
pub fn stop() {
    detector().stop();
}

/// Whether the global detector's worker is currently running
pub fn is_running() -> bool {
    detector().is_running()
}

/// Update the global detector's interval; takes effect on the next sleep
pub fn set_interval(interval_secs: u64) {
    detector().set_interval(interval_secs);
}

/// One-shot synchronous detection pass on the global detector
pub fn check_deadlock() -> bool {
    detector().check_deadlock()
}

/// Diagnostic report of the current suspected cycle
pub fn print_deadlock_info() {
    detector().print_deadlock_info();
}

/// Diagnostic dump of the three observation tables
pub fn print_status() {
    detector().print_status();
}
