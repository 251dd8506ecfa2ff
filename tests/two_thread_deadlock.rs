mod common;

use common::{DEADLOCK_TIMEOUT, expect_deadlock, start_detector};
use lockwatch::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// Thread T1 acquires L1 then requests L2; thread T2 acquires L2 then
// requests L1. Once both block, the detector must report a cycle of
// exactly those two threads.
#[test]
fn test_ab_ba_deadlock() {
    let harness = start_detector();

    let mutex_a = Arc::new(Mutex::new("Resource A"));
    let mutex_b = Arc::new(Mutex::new("Resource B"));

    let a_clone = Arc::clone(&mutex_a);
    let b_clone = Arc::clone(&mutex_b);
    let _thread1 = thread::spawn(move || {
        let _guard_a = a_clone.lock();

        // Give thread 2 time to acquire lock B
        thread::sleep(Duration::from_millis(100));

        // This blocks forever
        let _guard_b = b_clone.lock();
    });

    let a_clone = Arc::clone(&mutex_a);
    let b_clone = Arc::clone(&mutex_b);
    let _thread2 = thread::spawn(move || {
        let _guard_b = b_clone.lock();

        // Give thread 1 time to acquire lock A
        thread::sleep(Duration::from_millis(100));

        // This blocks forever
        let _guard_a = a_clone.lock();
    });

    let info = expect_deadlock(&harness, DEADLOCK_TIMEOUT);

    assert_eq!(
        info.thread_cycle.len(),
        2,
        "Deadlock should involve exactly 2 threads, got {:?}",
        info.thread_cycle
    );
    assert_eq!(
        info.thread_waiting_for_locks.len(),
        2,
        "There should be exactly 2 thread-lock waiting relationships"
    );

    // Each cycle participant must be waiting on a lock held by the other
    for &(thread_id, _) in &info.thread_waiting_for_locks {
        assert!(
            info.thread_cycle.contains(&thread_id),
            "Waiting thread {thread_id} missing from cycle {:?}",
            info.thread_cycle
        );
    }

    // Once reported, the worker is done for this run
    assert!(lockwatch::detector().deadlock_detected());

    // Threads remain deadlocked; we don't join them.
}
