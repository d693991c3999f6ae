//! Bounded free list for scratch buffers.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of idle items a pool keeps.
pub const DEFAULT_MAX_IDLE: usize = 64;

/// A mutex-guarded free list.
///
/// `get` pops an idle item or builds a fresh one; the returned guard puts the
/// item back when dropped. An item is owned by exactly one guard at a time.
pub struct Pool<T: Default> {
    idle: Mutex<Vec<T>>,
    max_idle: usize,
    new: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T: Default> Pool<T> {
    /// Create a pool that keeps at most `max_idle` items between uses.
    pub fn new(max_idle: usize, new: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
            new: Box::new(new),
        }
    }

    /// Take an item out of the pool.
    pub fn get(&self) -> Pooled<'_, T> {
        let item = self.lock().pop().unwrap_or_else(|| (self.new)());
        Pooled { pool: self, item }
    }

    /// Number of items currently idle.
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    fn put(&self, item: T) {
        let mut idle = self.lock();
        if idle.len() < self.max_idle {
            idle.push(item);
        }
    }

    // A panic while holding the lock cannot leave the free list half-updated.
    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An item borrowed from a [`Pool`], returned on drop.
///
/// Assigning through the guard (`*guard = bigger`) drops the previous item and
/// pools the new one instead.
pub struct Pooled<'a, T: Default> {
    pool: &'a Pool<T>,
    item: T,
}

impl<T: Default> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T: Default> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.item
    }
}

impl<T: Default> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        self.pool.put(std::mem::take(&mut self.item));
    }
}
