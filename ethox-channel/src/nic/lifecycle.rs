//! Serializes closing an endpoint against the operations using it.
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// State that exists only while open, behind a reader-writer lock.
///
/// Operations take the shared side and proceed only while the state is present, so several of
/// them run at the same time. Closing takes the exclusive side and removes the state. It can thus
/// never interleave with the check of an operation and an operation never sees the endpoint half
/// closed.
///
/// Closing is monotonic, once closed the state is gone for good.
#[derive(Debug)]
pub struct Lifecycle<S> {
    open: RwLock<Option<S>>,
}

impl<S> Lifecycle<S> {
    /// A new, open, guard around `state`.
    pub fn new(state: S) -> Self {
        Lifecycle { open: RwLock::new(Some(state)) }
    }

    /// Run `op` on the state while holding the shared side, if still open.
    ///
    /// Returns `None` without running `op` when already closed.
    pub fn operate<T>(&self, op: impl FnOnce(&S) -> T) -> Option<T> {
        self.read().as_ref().map(op)
    }

    /// Transition to closed, handing the state to `on_close` as part of the transition.
    ///
    /// Only the first call performs the transition and runs its callback. Returns whether this
    /// call was the one to do so.
    pub fn close(&self, on_close: impl FnOnce(S)) -> bool {
        match self.write().take() {
            Some(state) => {
                on_close(state);
                true
            },
            None => false,
        }
    }

    /// Whether the guard has been closed.
    pub fn is_closed(&self) -> bool {
        self.read().is_none()
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<S>> {
        self.open
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<S>> {
        self.open
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
