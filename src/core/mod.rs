mod builder;
mod detector;
mod graph;
mod locks;
mod logger;
mod multilock;
mod tables;
mod types;

pub use builder::Lockwatch;
pub use detector::{
    DEFAULT_INTERVAL_SECS, Detector, check_deadlock, detector, hooks, is_running,
    print_deadlock_info, print_status, set_interval, start, stop,
};
pub use graph::WaitForGraph;
pub use locks::{Mutex, MutexGuard};
pub use logger::EventLogger;
pub use types::{DeadlockInfo, LockEvent, LockId, ThreadId, get_current_thread_id};
