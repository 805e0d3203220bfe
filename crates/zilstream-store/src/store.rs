//! Root state owner.
//!
//! `Store` is single-writer; `StoreHandle` shares it behind a read/write
//! lock so readers (presentation, alert evaluation) never observe a
//! half-applied action.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use zilstream_core::RootState;

use crate::action::Action;
use crate::changes::Changes;
use crate::reducer::reduce;

/// Owned application state.
#[derive(Debug, Default)]
pub struct Store {
    state: RootState,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: RootState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &RootState {
        &self.state
    }

    /// Apply one action.
    pub fn dispatch(&mut self, action: Action) -> Changes {
        let name = action.name();
        let changes = reduce(&mut self.state, action);
        trace!(action = name, ?changes, "Dispatched");
        changes
    }

    /// Apply actions in order and merge their change reports.
    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = Action>) -> Changes {
        let mut changes = Changes::NONE;
        for action in actions {
            changes.merge(self.dispatch(action));
        }
        changes
    }
}

/// Cloneable shared store.
#[derive(Clone, Default)]
pub struct StoreHandle {
    inner: Arc<RwLock<Store>>,
}

impl StoreHandle {
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn dispatch(&self, action: Action) -> Changes {
        self.inner.write().dispatch(action)
    }

    pub fn dispatch_all(&self, actions: impl IntoIterator<Item = Action>) -> Changes {
        self.inner.write().dispatch_all(actions)
    }

    /// Run `f` against the current state under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&RootState) -> R) -> R {
        f(self.inner.read().state())
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> RootState {
        self.read(RootState::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::Change;

    #[test]
    fn test_dispatch_all_merges_changes() {
        let mut store = Store::new();
        let changes = store.dispatch_all(vec![
            Action::BlockHeightUpdated(1),
            Action::TokenInit(Vec::new()),
        ]);
        assert!(changes.contains(Change::NewBlock));
        assert!(changes.contains(Change::TokensInitialized));
        assert_eq!(store.state().blockchain.block_height, Some(1));
    }

    #[test]
    fn test_handle_shares_state() {
        let handle = StoreHandle::default();
        let other = handle.clone();
        handle.dispatch(Action::BlockHeightUpdated(42));
        assert_eq!(other.read(|s| s.blockchain.block_height), Some(42));
        assert_eq!(other.snapshot().blockchain.block_height, Some(42));
    }
}
