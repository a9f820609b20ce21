//! Scoped busy flags.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shareable on/off flag, readable from other tasks.
pub type BusyFlag = Arc<AtomicBool>;

/// Holds a flag set for its lifetime and clears it on drop.
#[derive(Debug)]
pub struct BusyGuard {
    flag: BusyFlag,
}

impl BusyGuard {
    /// Set the flag unconditionally.
    pub fn acquire(flag: &BusyFlag) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self { flag: flag.clone() }
    }

    /// Set the flag only if it is clear. Returns `None` when it is already held.
    pub fn try_acquire(flag: &BusyFlag) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

pub fn is_set(flag: &BusyFlag) -> bool {
    flag.load(Ordering::SeqCst)
}
