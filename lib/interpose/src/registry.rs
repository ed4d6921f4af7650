//! Ordered, shared collection of registered interceptors.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::trace;

use crate::Interceptor;
use crate::chain::Chain;

#[derive(Debug)]
struct Entry {
    slot: u64,
    interceptor: Arc<Interceptor>,
}

#[derive(Debug, Default)]
struct State {
    next_slot: u64,
    entries: Vec<Entry>,
}

/// Ordered interceptor registry.
///
/// Cloning a registry yields another handle on the same entries. Mutations
/// are synchronous and never fail; calls already in flight keep the
/// [`Chain`] they captured when they started.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    state: Arc<Mutex<State>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an interceptor.
    ///
    /// The returned [`Registration`] removes exactly this entry; it stays
    /// valid (as a no-op) after the entry is gone.
    pub fn register(&self, interceptor: impl Into<Arc<Interceptor>>) -> Registration {
        let mut state = self.lock();
        let slot = state.next_slot;
        state.next_slot += 1;
        state.entries.push(Entry {
            slot,
            interceptor: interceptor.into(),
        });
        trace!(slot, registered = state.entries.len(), "interceptor registered");

        Registration {
            state: Arc::downgrade(&self.state),
            slot,
        }
    }

    /// Remove the first entry holding this exact interceptor (pointer
    /// identity). Returns `true` if an entry was removed.
    pub fn remove(&self, interceptor: &Arc<Interceptor>) -> bool {
        let mut state = self.lock();
        let position = state
            .entries
            .iter()
            .position(|entry| Arc::ptr_eq(&entry.interceptor, interceptor));
        position
            .map(|index| state.entries.remove(index))
            .is_some()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Snapshot the current entries into a [`Chain`] for one call.
    ///
    /// The registry's own order is never touched.
    #[must_use]
    pub fn chain(&self) -> Chain {
        let state = self.lock();
        Chain::from_registered(
            state
                .entries
                .iter()
                .map(|entry| Arc::clone(&entry.interceptor)),
        )
    }
}

/// Handle returned by [`Registry::register`].
///
/// Dropping the handle does not unregister anything.
#[derive(Debug, Clone)]
pub struct Registration {
    state: Weak<Mutex<State>>,
    slot: u64,
}

impl Registration {
    /// Remove the registered entry if it is still present.
    ///
    /// Calling this again, after [`Registry::clear`], or after the registry
    /// is gone is a no-op. Returns `true` if an entry was removed.
    pub fn unregister(&self) -> bool {
        let Some(state) = self.state.upgrade() else {
            return false;
        };
        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
        let position = state.entries.iter().position(|entry| entry.slot == self.slot);
        let removed = position.map(|index| state.entries.remove(index)).is_some();
        if removed {
            trace!(slot = self.slot, "interceptor unregistered");
        }
        removed
    }

    /// Returns `true` while the registered entry is still present.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.state.upgrade().is_some_and(|state| {
            state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .iter()
                .any(|entry| entry.slot == self.slot)
        })
    }
}
