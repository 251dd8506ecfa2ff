use crate::core::multilock::{lock_pair, lock_triple};
use crate::core::types::{LockId, ThreadId};
use fxhash::FxHashMap;
use parking_lot::Mutex;

/// Diagnostic context recorded alongside a wait until stack capture is wired in
pub const WAIT_CONTEXT_PLACEHOLDER: &str = "[stack trace placeholder]";

/// The three observation tables, each under its own mutex
///
/// `holders` maps a lock to the thread that currently owns it, `waiters`
/// maps a blocked thread to the lock it is trying to acquire, and
/// `contexts` carries the diagnostic context for that wait. `waiters` and
/// `contexts` have identical key sets at every quiescent point.
///
/// Operations touching more than one table acquire the mutexes through the
/// simultaneous-lock helpers; single-table operations take only their own
/// mutex. None of these mutexes is ever held across a call to an
/// instrumented lock primitive.
pub(crate) struct StateTables {
    holders: Mutex<FxHashMap<LockId, ThreadId>>,
    waiters: Mutex<FxHashMap<ThreadId, LockId>>,
    contexts: Mutex<FxHashMap<ThreadId, String>>,
}

/// Independent shallow copies of the three tables, taken atomically
///
/// Unaffected by table mutation after the copy; the detection pass operates
/// on it without holding any table mutex.
#[derive(Debug, Clone, Default)]
pub(crate) struct TableSnapshot {
    pub holders: FxHashMap<LockId, ThreadId>,
    pub waiters: FxHashMap<ThreadId, LockId>,
    pub contexts: FxHashMap<ThreadId, String>,
}

impl StateTables {
    pub fn new() -> Self {
        StateTables {
            holders: Mutex::new(FxHashMap::default()),
            waiters: Mutex::new(FxHashMap::default()),
            contexts: Mutex::new(FxHashMap::default()),
        }
    }

    /// Record that `thread_id` is about to block on `lock_id`
    pub fn note_wait(&self, thread_id: ThreadId, lock_id: LockId, context: String) {
        let (mut waiters, mut contexts) = lock_pair(&self.waiters, &self.contexts);
        waiters.insert(thread_id, lock_id);
        contexts.insert(thread_id, context);
    }

    /// Record that `thread_id` now owns `lock_id` and is no longer blocked
    pub fn note_acquired(&self, thread_id: ThreadId, lock_id: LockId) {
        let (mut holders, mut waiters, mut contexts) =
            lock_triple(&self.holders, &self.waiters, &self.contexts);
        waiters.remove(&thread_id);
        contexts.remove(&thread_id);
        holders.insert(lock_id, thread_id);
    }

    /// Record that `lock_id` has been released
    ///
    /// Removal of an absent entry is a no-op; a release without a prior
    /// tracked acquire is tolerated shim misuse.
    pub fn note_released(&self, lock_id: LockId) {
        self.holders.lock().remove(&lock_id);
    }

    /// Atomically copy all three tables
    pub fn snapshot(&self) -> TableSnapshot {
        let (holders, waiters, contexts) =
            lock_triple(&self.holders, &self.waiters, &self.contexts);
        TableSnapshot {
            holders: holders.clone(),
            waiters: waiters.clone(),
            contexts: contexts.clone(),
        }
    }
}
