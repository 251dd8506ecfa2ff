use crate::core::detector::hooks;
use crate::core::locks::NEXT_LOCK_ID;
use crate::core::types::{LockId, ThreadId, get_current_thread_id};
use parking_lot::{Mutex as ParkingLotMutex, MutexGuard as ParkingLotMutexGuard};
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::Ordering;

/// A mutex wrapper that reports lock operations for deadlock detection
///
/// Provides the same interface as a plain mutex but brackets every blocking
/// acquisition with the observation hooks, forming the instrumentation shim
/// contract: pre-acquire, real acquire, post-acquire; and on guard drop,
/// real release, post-release. Exclusive and non-recursive, like the locks
/// the detector models.
///
/// # Example
///
/// ```rust
/// use lockwatch::Mutex;
/// use std::sync::Arc;
/// use std::thread;
///
/// let mutex = Arc::new(Mutex::new(42));
/// let mutex_clone = Arc::clone(&mutex);
///
/// thread::spawn(move || {
///     let mut data = mutex.lock();
///     *data += 1;
/// });
///
/// let mut data = mutex_clone.lock();
/// *data += 10;
/// ```
pub struct Mutex<T> {
    /// Unique identifier for this mutex
    id: LockId,
    /// The wrapped mutex
    inner: ParkingLotMutex<T>,
}

/// Guard for a [`Mutex`], reports the release when dropped
///
/// The underlying lock is released first, then the release is reported, so
/// the holders table never claims a lock that is already free.
pub struct MutexGuard<'a, T> {
    /// Thread that owns this guard
    thread_id: ThreadId,
    /// Lock that this guard is for
    lock_id: LockId,
    /// The inner guard, dropped by hand before the release is reported
    guard: ManuallyDrop<ParkingLotMutexGuard<'a, T>>,
}

impl<T> Mutex<T> {
    /// Create a new Mutex with an automatically assigned ID
    pub fn new(value: T) -> Self {
        Mutex {
            id: NEXT_LOCK_ID.fetch_add(1, Ordering::SeqCst),
            inner: ParkingLotMutex::new(value),
        }
    }

    /// Get the ID of this mutex
    pub fn id(&self) -> LockId {
        self.id
    }

    /// Acquire the lock, reporting the attempt and the acquisition
    ///
    /// Blocks until the lock is available. If this acquisition deadlocks,
    /// the attempt record persists and the background detector will see the
    /// cycle.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        let thread_id = get_current_thread_id();

        hooks::on_lock_before(thread_id, self.id);
        let guard = self.inner.lock();
        hooks::on_lock_after(thread_id, self.id);

        MutexGuard {
            thread_id,
            lock_id: self.id,
            guard: ManuallyDrop::new(guard),
        }
    }

    /// Attempt to acquire the lock without blocking
    ///
    /// A failed try is not a wait, so no attempt is recorded.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        let thread_id = get_current_thread_id();
        let guard = self.inner.try_lock()?;
        hooks::on_lock_after(thread_id, self.id);

        Some(MutexGuard {
            thread_id,
            lock_id: self.id,
            guard: ManuallyDrop::new(guard),
        })
    }
}

impl<T> Deref for MutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<T> DerefMut for MutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

impl<T> Drop for MutexGuard<'_, T> {
    fn drop(&mut self) {
        // Release the real lock, then report: real release precedes the
        // trailing observation per the shim contract
        unsafe { ManuallyDrop::drop(&mut self.guard) };
        hooks::on_unlock_after(self.thread_id, self.lock_id);
    }
}
