mod common;

use common::{expect_deadlock, start_detector};
use lockwatch::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// Two threads idle for 3 seconds before entering the AB/BA pattern. A
// detector started at t=0 with interval 1 must stay silent while the
// threads are idle and first report at t >= 3 + 1, within a couple of
// intervals of slack.
#[test]
fn test_detection_latency_is_interval_bounded() {
    let started = Instant::now();
    let harness = start_detector();

    let mutex_a = Arc::new(Mutex::new(()));
    let mutex_b = Arc::new(Mutex::new(()));

    let a = Arc::clone(&mutex_a);
    let b = Arc::clone(&mutex_b);
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(3));
        let _guard_a = a.lock();
        thread::sleep(Duration::from_millis(100));
        let _guard_b = b.lock();
    });

    let a = Arc::clone(&mutex_a);
    let b = Arc::clone(&mutex_b);
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(3));
        let _guard_b = b.lock();
        thread::sleep(Duration::from_millis(100));
        let _guard_a = a.lock();
    });

    let info = expect_deadlock(&harness, Duration::from_secs(10));
    let elapsed = started.elapsed();

    assert_eq!(info.thread_cycle.len(), 2);
    assert!(
        elapsed >= Duration::from_secs(3),
        "report arrived at {elapsed:?}, before the deadlock even existed"
    );
    assert!(
        elapsed <= Duration::from_secs(7),
        "report arrived at {elapsed:?}, far beyond the configured cadence"
    );

    // Threads remain deadlocked; we don't join them.
}
