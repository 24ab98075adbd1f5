//! Lazily constructed process-wide handles.

use std::sync::Arc;

use parking_lot::{RwLock, const_rwlock};

/// Holds at most one shared instance, built on first access.
///
/// Construction is double-checked: a read lock serves the common path, and
/// only a miss takes the write lock, re-checks, and constructs. Concurrent
/// first callers all receive the same instance and the initialiser runs once.
/// `shutdown` empties the cell so the next access builds a fresh instance.
pub struct InstanceCell<T> {
    slot: RwLock<Option<Arc<T>>>,
}

impl<T> InstanceCell<T> {
    pub const fn new() -> Self {
        Self {
            slot: const_rwlock(None),
        }
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.read().as_ref().map(Arc::clone)
    }

    pub fn get_or_init<F>(&self, init: F) -> Arc<T>
    where
        F: FnOnce() -> Arc<T>,
    {
        if let Some(existing) = self.get() {
            return existing;
        }

        let mut slot = self.slot.write();
        if let Some(existing) = slot.as_ref() {
            return Arc::clone(existing);
        }
        let created = init();
        *slot = Some(Arc::clone(&created));
        created
    }

    /// Removes and returns the current instance, if any.
    pub fn shutdown(&self) -> Option<Arc<T>> {
        self.slot.write().take()
    }
}

impl<T> Default for InstanceCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
