//! # Lockwatch
//!
//! A runtime deadlock detector for multithreaded programs that use plain
//! mutual-exclusion primitives.
//!
//! Lockwatch observes every attempt to acquire and release a lock,
//! maintains an evolving model of who holds what and who is waiting for
//! what, and periodically searches that model for a circular wait, the
//! classic necessary-and-sufficient condition for a resource deadlock when
//! each lock has a single holder.
//!
//! ## Overview
//!
//! Deadlocks are a common concurrency issue that can be challenging to
//! debug and reproduce. Lockwatch helps by tracking mutex interactions
//! between threads: instrumentation hooks bracket each lock operation and
//! keep three tables current (lock → holder, thread → awaited lock,
//! thread → wait context). A background worker periodically takes an
//! atomic snapshot of the tables, materializes the wait-for graph, tests
//! it for a cycle with Kahn's topological reduction, and reports the first
//! confirmed deadlock.
//!
//! The detector only observes: it never breaks deadlocks, rolls back
//! threads, or otherwise interferes with program execution, and it makes
//! no attempt to see locks acquired outside the instrumented path.
//!
//! ## Features
//!
//! - **Background deadlock detection**: a dedicated worker re-checks the
//!   wait-for graph at a configurable cadence and reports once
//! - **Tracked mutex**: a drop-in wrapper that feeds the hooks around a
//!   real blocking mutex
//! - **Deadlock callbacks**: a user callback dispatched on its own thread,
//!   so it runs even though the program is deadlocked
//! - **Lock operation logging**: optional JSON-lines record of every
//!   observed attempt/acquire/release
//! - **C FFI bindings**: the hook and lifecycle surface exported with a C
//!   ABI for shim-based integration
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lockwatch::{Lockwatch, Mutex};
//! use std::sync::Arc;
//! use std::thread;
//! use std::time::Duration;
//!
//! // Initialize the detector with a deadlock callback
//! Lockwatch::new()
//!     .interval_secs(1)
//!     .callback(|info| {
//!         println!("Deadlock detected! Cycle: {:?}", info.thread_cycle);
//!     })
//!     .start()
//!     .expect("Failed to initialize detector");
//!
//! // Create two mutexes
//! let mutex_a = Arc::new(Mutex::new("Resource A"));
//! let mutex_b = Arc::new(Mutex::new("Resource B"));
//!
//! // First thread: lock A, then try to lock B
//! let a_clone = Arc::clone(&mutex_a);
//! let b_clone = Arc::clone(&mutex_b);
//! let t1 = thread::spawn(move || {
//!     let _lock_a = a_clone.lock();
//!     thread::sleep(Duration::from_millis(100));
//!     let _lock_b = b_clone.lock();
//! });
//!
//! // Second thread: lock B, then try to lock A (potential deadlock)
//! let a_clone = Arc::clone(&mutex_a);
//! let b_clone = Arc::clone(&mutex_b);
//! let t2 = thread::spawn(move || {
//!     let _lock_b = b_clone.lock();
//!     thread::sleep(Duration::from_millis(100));
//!     let _lock_a = a_clone.lock();
//! });
//! ```

mod core;
pub use core::{
    DEFAULT_INTERVAL_SECS, DeadlockInfo, Detector, EventLogger, LockEvent, LockId, Lockwatch,
    Mutex, MutexGuard, ThreadId, WaitForGraph, check_deadlock, detector, get_current_thread_id,
    is_running, print_deadlock_info, print_status, set_interval, start, stop,
};
pub use core::hooks::{on_lock_after, on_lock_before, on_unlock_after};

pub mod ffi;

pub mod demo;
