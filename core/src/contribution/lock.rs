//! Scoped Pool Lock

use super::ContributionPool;
use std::sync::MutexGuard;

/// Holds the pool's main splatting mutex for as long as it lives. No splatter can claim a tile while
/// the lock is held, so code writing out the film sees a consistent image. A tile splat already in
/// progress completes before the film's tile mutex can be taken.
///
/// Do not call `ContributionPool` methods that take the pool mutex while holding this lock.
pub struct ScopedPoolLock<'a> {
    guard: Option<MutexGuard<'a, ()>>,
}

impl<'a> ScopedPoolLock<'a> {
    /// Locks the pool's main splatting mutex.
    ///
    /// * `pool` - The pool.
    pub fn new(pool: &'a ContributionPool) -> Self {
        Self {
            guard: Some(pool.main_splatting.lock().unwrap()),
        }
    }

    /// Returns `true` while the lock is held.
    pub fn is_locked(&self) -> bool {
        self.guard.is_some()
    }

    /// Releases the lock early. Does nothing if already released.
    pub fn unlock(&mut self) {
        self.guard.take();
    }
}
