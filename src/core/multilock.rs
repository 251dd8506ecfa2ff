//! Simultaneous acquisition of the detector's own mutexes.
//!
//! The state tables form a multi-lock resource mutated from arbitrary
//! application threads, so the detector is exposed to the exact pathology
//! it diagnoses. Every cross-table operation must go through these helpers;
//! acquiring table mutexes sequentially is forbidden.
//!
//! The algorithm is acquire-all-or-release-all: block on one mutex, try the
//! rest without blocking, and on failure release everything and restart
//! blocking on the mutex that was busy. Since no thread ever blocks while
//! holding a guard, the helpers themselves cannot deadlock.

use parking_lot::{Mutex, MutexGuard};
use std::thread;

/// Acquire two mutexes as a single atomic step.
pub fn lock_pair<'a, A, B>(
    first: &'a Mutex<A>,
    second: &'a Mutex<B>,
) -> (MutexGuard<'a, A>, MutexGuard<'a, B>) {
    loop {
        let a = first.lock();
        match second.try_lock() {
            Some(b) => return (a, b),
            None => drop(a),
        }

        let b = second.lock();
        match first.try_lock() {
            Some(a) => return (a, b),
            None => drop(b),
        }

        thread::yield_now();
    }
}

/// Acquire three mutexes as a single atomic step.
pub fn lock_triple<'a, A, B, C>(
    first: &'a Mutex<A>,
    second: &'a Mutex<B>,
    third: &'a Mutex<C>,
) -> (MutexGuard<'a, A>, MutexGuard<'a, B>, MutexGuard<'a, C>) {
    // Which mutex to block on; rotated to the busy one after each failure
    let mut blocking = 0usize;
    loop {
        match blocking {
            0 => {
                let a = first.lock();
                match second.try_lock() {
                    Some(b) => match third.try_lock() {
                        Some(c) => return (a, b, c),
                        None => blocking = 2,
                    },
                    None => blocking = 1,
                }
            }
            1 => {
                let b = second.lock();
                match third.try_lock() {
                    Some(c) => match first.try_lock() {
                        Some(a) => return (a, b, c),
                        None => blocking = 0,
                    },
                    None => blocking = 2,
                }
            }
            _ => {
                let c = third.lock();
                match first.try_lock() {
                    Some(a) => match second.try_lock() {
                        Some(b) => return (a, b, c),
                        None => blocking = 1,
                    },
                    None => blocking = 0,
                }
            }
        }
        thread::yield_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn lock_pair_returns_both_guards() {
        let a = Mutex::new(1);
        let b = Mutex::new(2);
        let (ga, gb) = lock_pair(&a, &b);
        assert_eq!((*ga, *gb), (1, 2));
    }

    #[test]
    fn lock_triple_returns_all_guards() {
        let a = Mutex::new(1);
        let b = Mutex::new(2);
        let c = Mutex::new(3);
        let (ga, gb, gc) = lock_triple(&a, &b, &c);
        assert_eq!((*ga, *gb, *gc), (1, 2, 3));
    }

    // Opposite-order pair acquisition from many threads must always make
    // progress. With sequential locking this interleaving deadlocks almost
    // immediately.
    #[test]
    fn opposing_pair_orders_never_deadlock() {
        let a = Arc::new(Mutex::new(0u64));
        let b = Arc::new(Mutex::new(0u64));
        let (done_tx, done_rx) = mpsc::channel();

        let mut handles = Vec::new();
        for flip in [false, true, false, true] {
            let a = Arc::clone(&a);
            let b = Arc::clone(&b);
            let done = done_tx.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..2_000 {
                    if flip {
                        let (mut gb, mut ga) = lock_pair(&*b, &*a);
                        *ga += 1;
                        *gb += 1;
                    } else {
                        let (mut ga, mut gb) = lock_pair(&*a, &*b);
                        *ga += 1;
                        *gb += 1;
                    }
                }
                done.send(()).unwrap();
            }));
        }

        for _ in 0..4 {
            done_rx
                .recv_timeout(Duration::from_secs(10))
                .expect("lock_pair stress did not complete; detector-internal deadlock");
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*a.lock(), 8_000);
        assert_eq!(*b.lock(), 8_000);
    }

    // All six permutations of the triple plus a concurrent pair user, to
    // exercise the rotation path.
    #[test]
    fn triple_under_contention_never_deadlocks() {
        let a = Arc::new(Mutex::new(0u64));
        let b = Arc::new(Mutex::new(0u64));
        let c = Arc::new(Mutex::new(0u64));
        let (done_tx, done_rx) = mpsc::channel();

        let mut handles = Vec::new();
        for order in 0..6 {
            let a = Arc::clone(&a);
            let b = Arc::clone(&b);
            let c = Arc::clone(&c);
            let done = done_tx.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..1_000 {
                    let (mut ga, mut gb, mut gc) = match order {
                        0 => lock_triple(&*a, &*b, &*c),
                        1 => {
                            let (gb, gc, ga) = lock_triple(&*b, &*c, &*a);
                            (ga, gb, gc)
                        }
                        2 => {
                            let (gc, ga, gb) = lock_triple(&*c, &*a, &*b);
                            (ga, gb, gc)
                        }
                        3 => {
                            let (ga, gc, gb) = lock_triple(&*a, &*c, &*b);
                            (ga, gb, gc)
                        }
                        4 => {
                            let (gb, ga, gc) = lock_triple(&*b, &*a, &*c);
                            (ga, gb, gc)
                        }
                        _ => {
                            let (gc, gb, ga) = lock_triple(&*c, &*b, &*a);
                            (ga, gb, gc)
                        }
                    };
                    *ga += 1;
                    *gb += 1;
                    *gc += 1;
                }
                done.send(()).unwrap();
            }));
        }

        let pair_a = Arc::clone(&a);
        let pair_b = Arc::clone(&b);
        let done = done_tx.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..1_000 {
                let (mut ga, mut gb) = lock_pair(&*pair_b, &*pair_a);
                *ga += 1;
                *gb += 1;
            }
            done.send(()).unwrap();
        }));

        for _ in 0..7 {
            done_rx
                .recv_timeout(Duration::from_secs(20))
                .expect("lock_triple stress did not complete; detector-internal deadlock");
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*a.lock(), 7_000);
        assert_eq!(*b.lock(), 7_000);
        assert_eq!(*c.lock(), 7_000);
    }
}
