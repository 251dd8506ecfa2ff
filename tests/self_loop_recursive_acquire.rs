use lockwatch::{check_deadlock, detector, on_lock_after, on_lock_before};

// Unsupported recursive use, driven through the raw hooks because a real
// second acquire would block the test forever: after the second
// pre-acquire the snapshot holds both holders[L1] = T1 and
// waiters[T1] = L1, a one-vertex cycle.
#[test]
fn test_recursive_acquire_reports_singleton_cycle() {
    let t1 = 9_001;
    let l1 = 0xdead;

    on_lock_before(t1, l1);
    on_lock_after(t1, l1);
    on_lock_before(t1, l1);

    assert!(check_deadlock(), "self-loop not reported");
    assert_eq!(detector().cycle_participants(), vec![t1]);
}
