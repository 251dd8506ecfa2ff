//! Built-in demonstration scenarios for the CLI.
//!
//! Each scenario initializes the global detector, drives tracked mutexes
//! from real threads, and reports whether the background worker flagged a
//! deadlock. The deadlocking scenarios leave their worker threads blocked
//! on purpose; the process exits with them still parked.

use crate::core::{DeadlockInfo, Lockwatch, Mutex, print_status};
use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

fn start_detector(tx: mpsc::Sender<DeadlockInfo>) -> Result<()> {
    Lockwatch::new()
        .interval_secs(1)
        .callback(move |info| {
            let _ = tx.send(info);
        })
        .start()
}

fn await_report(rx: &mpsc::Receiver<DeadlockInfo>, timeout: Duration) -> Option<DeadlockInfo> {
    rx.recv_timeout(timeout).ok()
}

/// Two threads acquiring two locks in opposite orders.
pub fn run_ab_ba() -> Result<()> {
    let (tx, rx) = mpsc::channel();
    start_detector(tx)?;

    let mutex_a = Arc::new(Mutex::new("Resource A"));
    let mutex_b = Arc::new(Mutex::new("Resource B"));

    let a = Arc::clone(&mutex_a);
    let b = Arc::clone(&mutex_b);
    thread::spawn(move || {
        let _guard_a = a.lock();
        thread::sleep(Duration::from_millis(100));
        let _guard_b = b.lock();
    });

    let a = Arc::clone(&mutex_a);
    let b = Arc::clone(&mutex_b);
    thread::spawn(move || {
        let _guard_b = b.lock();
        thread::sleep(Duration::from_millis(100));
        let _guard_a = a.lock();
    });

    match await_report(&rx, Duration::from_secs(5)) {
        Some(info) => println!("AB/BA deadlock reported: cycle {:?}", info.thread_cycle),
        None => println!("no deadlock reported within 5s (unexpected for this scenario)"),
    }
    Ok(())
}

/// `n` threads, each holding lock `i` and requesting lock `(i + 1) % n`.
pub fn run_ring(n: usize) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    start_detector(tx)?;

    let locks: Vec<_> = (0..n).map(|i| Arc::new(Mutex::new(format!("L{i}")))).collect();
    let ready = Arc::new(AtomicUsize::new(0));

    for i in 0..n {
        let first = Arc::clone(&locks[i]);
        let second = Arc::clone(&locks[(i + 1) % n]);
        let ready = Arc::clone(&ready);
        thread::spawn(move || {
            ready.fetch_add(1, Ordering::SeqCst);
            while ready.load(Ordering::SeqCst) < n {
                thread::yield_now();
            }
            let _a = first.lock();
            thread::sleep(Duration::from_millis(100));
            let _b = second.lock();
        });
    }

    match await_report(&rx, Duration::from_secs(5)) {
        Some(info) => println!("{n}-ring deadlock reported: cycle {:?}", info.thread_cycle),
        None => println!("no deadlock reported within 5s (unexpected for this scenario)"),
    }
    Ok(())
}

/// Two threads repeatedly taking both locks in the same order; never deadlocks.
pub fn run_same_order() -> Result<()> {
    let (tx, rx) = mpsc::channel();
    start_detector(tx)?;

    let mutex_a = Arc::new(Mutex::new(0u64));
    let mutex_b = Arc::new(Mutex::new(0u64));

    let mut handles = Vec::new();
    for _ in 0..2 {
        let a = Arc::clone(&mutex_a);
        let b = Arc::clone(&mutex_b);
        handles.push(thread::spawn(move || {
            for _ in 0..200 {
                let mut ga = a.lock();
                let mut gb = b.lock();
                *ga += 1;
                *gb += 1;
                thread::sleep(Duration::from_millis(10));
            }
        }));
    }
    for handle in handles {
        let _ = handle.join();
    }

    // Both threads are done; give the worker two more intervals to be sure
    match await_report(&rx, Duration::from_secs(2)) {
        Some(info) => println!(
            "unexpected deadlock report: cycle {:?}",
            info.thread_cycle
        ),
        None => println!("no deadlock, as expected"),
    }
    print_status();
    Ok(())
}
