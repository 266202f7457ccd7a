//! Shared selection state
//!
//! [`SharedState`] wraps a [`SelectionState`] so that the session loop and
//! in-flight fetch tasks can both reach it. Writers go through
//! [`SharedState::update`], which wakes anyone awaiting
//! [`SharedState::changed`] whenever the update left the state dirty.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lookup_core::{LookupView, SelectionState};
use tokio::sync::Notify;

/// Thread-safe handle to one control's selection state (cheap to clone)
#[derive(Clone, Default)]
pub struct SharedState {
    inner: Arc<Mutex<SelectionState>>,
    changed: Arc<Notify>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the state for reading
    ///
    /// A poisoned lock is recovered: the state is plain data and every
    /// mutation leaves it consistent.
    pub fn lock(&self) -> MutexGuard<'_, SelectionState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the state and wake the renderer if anything changed
    pub fn update<R>(&self, f: impl FnOnce(&mut SelectionState) -> R) -> R {
        let (result, dirty) = {
            let mut state = self.lock();
            let result = f(&mut state);
            (result, state.is_dirty())
        };
        if dirty {
            self.changed.notify_one();
        }
        result
    }

    /// Read and clear the rebuild flag
    pub fn take_dirty(&self) -> bool {
        self.lock().take_dirty()
    }

    /// Snapshot for the presentation layer
    pub fn view(&self) -> LookupView {
        self.lock().view()
    }

    /// Wait until an update leaves the state dirty
    pub async fn changed(&self) {
        self.changed.notified().await
    }
}

impl std::fmt::Debug for SharedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedState")
            .field("state", &*self.lock())
            .finish()
    }
}
