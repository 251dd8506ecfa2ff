//! C FFI bindings for the deadlock detector.
//!
//! The intended consumer is a macro- or interposition-based shim around the
//! platform's lock primitives: it extracts the calling thread's identifier
//! and the lock's address and bookends each real lock/unlock call with the
//! matching hook. Deadlock reports are delivered to an optional C callback
//! as a JSON-encoded [`DeadlockInfo`](crate::DeadlockInfo).

use crate::core::{Lockwatch, detector};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether `lockwatch_init` has completed
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// C callback invoked with the deadlock report JSON
static mut DEADLOCK_CALLBACK: Option<extern "C" fn(*const c_char)> = None;

/// Initialize lockwatch.
///
/// Sets up the global deadlock detector with optional event logging and an
/// optional deadlock callback, and starts background detection at the given
/// interval. Must be called before the hook functions.
///
/// # Arguments
/// * `interval_seconds` - Detection cadence in seconds (values below 1 are clamped).
/// * `log_path` - Path to a log file as a null-terminated C string, or NULL to disable logging.
/// * `callback` - Function pointer to call when a deadlock is detected, or NULL for no callback.
///
/// # Returns
/// * `0` on success
/// * `1` if the detector is already initialized
/// * `-1` if the log path contains invalid UTF-8
/// * `-2` if the logger failed to initialize
///
/// # Safety
/// The caller must ensure `log_path` is either NULL or a valid
/// null-terminated string, and that initialization is not raced from
/// multiple threads.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lockwatch_init(
    interval_seconds: u64,
    log_path: *const c_char,
    callback: Option<extern "C" fn(*const c_char)>,
) -> c_int {
    unsafe {
        if INITIALIZED.load(Ordering::SeqCst) {
            return 1;
        }

        let log_path_option = if !log_path.is_null() {
            match CStr::from_ptr(log_path).to_str() {
                Ok(s) => Some(s.to_string()),
                Err(_) => return -1,
            }
        } else {
            None
        };

        DEADLOCK_CALLBACK = callback;

        let mut builder = Lockwatch::new().interval_secs(interval_seconds);
        if let Some(path) = log_path_option {
            builder = builder.with_log(path);
        }
        let builder = builder.callback(|info| {
            #[allow(static_mut_refs)]
            let cb = unsafe { DEADLOCK_CALLBACK };
            if let Some(cb) = cb {
                if let Ok(json) = serde_json::to_string(&info) {
                    if let Ok(c_str) = CString::new(json) {
                        cb(c_str.as_ptr());
                    }
                }
            }
        });

        if builder.start().is_err() {
            return -2;
        }

        INITIALIZED.store(true, Ordering::SeqCst);
        0
    }
}

/// Record that a thread is about to block acquiring a lock.
///
/// Call immediately before the real lock call.
#[unsafe(no_mangle)]
pub extern "C" fn lockwatch_lock_before(thread_id: u64, lock_addr: u64) {
    detector().on_lock_before(thread_id, lock_addr);
}

/// Record that a thread acquired a lock.
///
/// Call immediately after the real lock call returns.
#[unsafe(no_mangle)]
pub extern "C" fn lockwatch_lock_after(thread_id: u64, lock_addr: u64) {
    detector().on_lock_after(thread_id, lock_addr);
}

/// Record that a thread released a lock.
///
/// Call immediately after the real unlock call returns.
#[unsafe(no_mangle)]
pub extern "C" fn lockwatch_unlock_after(thread_id: u64, lock_addr: u64) {
    detector().on_unlock_after(thread_id, lock_addr);
}

/// Start background detection with the given interval in seconds.
#[unsafe(no_mangle)]
pub extern "C" fn lockwatch_start(interval_seconds: u64) {
    detector().start(interval_seconds);
}

/// Stop background detection and join the worker.
#[unsafe(no_mangle)]
pub extern "C" fn lockwatch_stop() {
    detector().stop();
}

/// Whether the background worker is currently running.
///
/// Returns 1 if running, 0 otherwise.
#[unsafe(no_mangle)]
pub extern "C" fn lockwatch_is_running() -> c_int {
    detector().is_running() as c_int
}

/// Update the detection interval; takes effect on the next sleep.
#[unsafe(no_mangle)]
pub extern "C" fn lockwatch_set_interval(interval_seconds: u64) {
    detector().set_interval(interval_seconds);
}

/// Run one synchronous detection pass.
///
/// Returns 1 if a deadlock cycle was found, 0 otherwise.
#[unsafe(no_mangle)]
pub extern "C" fn lockwatch_check_deadlock() -> c_int {
    detector().check_deadlock() as c_int
}

/// Print a diagnostic report of the current suspected cycle to stdout.
#[unsafe(no_mangle)]
pub extern "C" fn lockwatch_print_deadlock_info() {
    detector().print_deadlock_info();
}

/// Print a diagnostic dump of the observation tables to stdout.
#[unsafe(no_mangle)]
pub extern "C" fn lockwatch_print_status() {
    detector().print_status();
}
