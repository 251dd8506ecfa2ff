//! Observation hooks bracketing instrumented lock operations.
//!
//! The instrumentation shim calls `on_lock_before`, then the real acquire,
//! then `on_lock_after`; and the real release, then `on_unlock_after`. If a
//! real acquire never returns because the thread is deadlocked, the
//! waiters/contexts entry persists, which is exactly what the detector
//! needs to see the deadlock.
//!
//! The hooks have no failure modes beyond shim misuse, which is tolerated
//! silently: they run inside arbitrary user code and must never panic or
//! abort. They block only on the table mutexes, held for the duration of a
//! few-element map mutation, and are never held across the underlying lock
//! primitive.

use crate::core::detector::{Detector, detector};
use crate::core::logger;
use crate::core::tables::WAIT_CONTEXT_PLACEHOLDER;
use crate::core::types::{LockEvent, LockId, ThreadId};

impl Detector {
    /// Record that `thread_id` is about to block acquiring `lock_id`
    ///
    /// Inserts the waiters and contexts entries under an atomic pair-lock.
    /// The context is the stack-trace placeholder until capture is wired in.
    pub fn on_lock_before(&self, thread_id: ThreadId, lock_id: LockId) {
        self.on_lock_before_with_context(thread_id, lock_id, WAIT_CONTEXT_PLACEHOLDER.to_string());
    }

    /// Variant of [`on_lock_before`](Detector::on_lock_before) with a
    /// caller-supplied wait context (the stack capture delegation point)
    pub fn on_lock_before_with_context(
        &self,
        thread_id: ThreadId,
        lock_id: LockId,
        context: String,
    ) {
        self.tables.note_wait(thread_id, lock_id, context);
        logger::log_event(thread_id, lock_id, LockEvent::Attempt);
    }

    /// Record that `thread_id` acquired `lock_id`
    ///
    /// Removes the wait entries and installs the holder under an atomic
    /// triple-lock, so no observer sees the thread both waiting and holding.
    pub fn on_lock_after(&self, thread_id: ThreadId, lock_id: LockId) {
        self.tables.note_acquired(thread_id, lock_id);
        logger::log_event(thread_id, lock_id, LockEvent::Acquired);
    }

    /// Record that `thread_id` released `lock_id`
    ///
    /// A release that was never observed acquiring is a silent no-op.
    pub fn on_unlock_after(&self, thread_id: ThreadId, lock_id: LockId) {
        self.tables.note_released(lock_id);
        logger::log_event(thread_id, lock_id, LockEvent::Released);
    }
}

/// Record a lock attempt with the global detector
pub fn on_lock_before(thread_id: ThreadId, lock_id: LockId) {
    detector().on_lock_before(thread_id, lock_id);
}

/// Record a lock acquisition with the global detector
pub fn on_lock_after(thread_id: ThreadId, lock_id: LockId) {
    detector().on_lock_after(thread_id, lock_id);
}

/// Record a lock release with the global detector
pub fn on_unlock_after(thread_id: ThreadId, lock_id: LockId) {
    detector().on_unlock_after(thread_id, lock_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Hooks on a private instance; the global detector is exercised by the
    // integration tests.
    #[test]
    fn bracket_sequence_leaves_tables_clean() {
        let det = Detector::new();
        det.on_lock_before(1, 10);
        det.on_lock_after(1, 10);
        det.on_unlock_after(1, 10);
        assert!(!det.check_deadlock());
    }

    #[test]
    fn two_thread_cross_wait_is_a_cycle() {
        let det = Detector::new();
        // T1 holds L1, T2 holds L2
        det.on_lock_before(1, 1);
        det.on_lock_after(1, 1);
        det.on_lock_before(2, 2);
        det.on_lock_after(2, 2);
        // T1 blocks on L2, T2 blocks on L1
        det.on_lock_before(1, 2);
        det.on_lock_before(2, 1);
        assert!(det.check_deadlock());
    }

    #[test]
    fn recursive_acquire_shows_up_as_self_loop() {
        let det = Detector::new();
        det.on_lock_before(1, 10);
        det.on_lock_after(1, 10);
        // Unsupported recursive use: the same thread blocks on its own lock
        det.on_lock_before(1, 10);
        assert!(det.check_deadlock());
        assert_eq!(det.run_detection_pass(), Some(vec![1]));
    }

    #[test]
    fn waiter_with_released_holder_contributes_no_edge() {
        let det = Detector::new();
        det.on_lock_before(1, 1);
        det.on_lock_after(1, 1);
        det.on_lock_before(2, 1);
        // T1 releases before the pass; the transient wait cannot be a cycle
        det.on_unlock_after(1, 1);
        assert!(!det.check_deadlock());
    }

    #[test]
    fn linear_wait_chain_is_not_a_deadlock() {
        let det = Detector::new();
        det.on_lock_before(1, 1);
        det.on_lock_after(1, 1);
        det.on_lock_before(2, 1);
        assert!(!det.check_deadlock());
    }
}
