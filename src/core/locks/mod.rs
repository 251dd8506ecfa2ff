mod mutex;

pub use mutex::{Mutex, MutexGuard};

use std::sync::atomic::AtomicU64;

// Global counter for generating unique lock IDs
pub(crate) static NEXT_LOCK_ID: AtomicU64 = AtomicU64::new(1);
