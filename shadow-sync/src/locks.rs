//! Per-post mutual exclusion.
//!
//! Reconciliation and association both read-modify-write the archive record
//! and the live term of a single post. Running them under that post's lock
//! keeps two requests against the same post from losing each other's writes.

use shadow_types::PostId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Lazily created lock per post id.
#[derive(Debug, Default)]
pub struct EntityLocks {
    slots: Mutex<HashMap<PostId, Arc<Mutex<()>>>>,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock of `post`.
    ///
    /// The lock guards no data, so a poisoned lock is simply taken over.
    pub fn with_lock<T>(&self, post: PostId, f: impl FnOnce() -> T) -> T {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(post).or_default())
        };

        let out = {
            let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map and this call hold the slot: nobody is waiting on it.
        if Arc::strong_count(&slot) == 2 {
            slots.remove(&post);
        }
        out
    }

    /// Number of posts with a live lock slot.
    pub fn active(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
