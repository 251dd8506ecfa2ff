use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread & Lock identifier types
///
/// Both are opaque fixed-width integers, never interned. Thread ids are
/// assigned from a process-wide counter on a thread's first observed
/// operation; lock ids come from the tracked wrapper's counter or, over
/// FFI, from the lock's address.
pub type ThreadId = u64;
pub type LockId = u64;

/// Represents the kind of lock event observed by a hook
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LockEvent {
    /// Thread is attempting to acquire a lock
    Attempt,
    /// Thread successfully acquired a lock
    Acquired,
    /// Thread released a lock
    Released,
}

/// Represents the result of a deadlock detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlockInfo {
    /// List of threads involved in the deadlock cycle
    pub thread_cycle: Vec<ThreadId>,
    /// Map of threads to locks they're waiting for
    pub thread_waiting_for_locks: Vec<(ThreadId, LockId)>,
    /// Timestamp when the deadlock was detected
    pub timestamp: String,
}

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_THREAD_ID: ThreadId = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// Get a unique identifier of the current thread
///
/// Ids are process-unique and stable for the lifetime of the thread.
pub fn get_current_thread_id() -> ThreadId {
    CURRENT_THREAD_ID.with(|id| *id)
}
