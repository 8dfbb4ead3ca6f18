//! Shared application state.

use std::sync::Arc;

use sfl_lifecycle::{InMemoryContractStore, InMemoryUserDirectory};

struct Inner {
    store: InMemoryContractStore,
    users: InMemoryUserDirectory,
}

/// Cheaply cloneable; all clones share the same data.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                store: InMemoryContractStore::new(),
                users: InMemoryUserDirectory::new(),
            }),
        }
    }

    pub fn store(&self) -> &InMemoryContractStore {
        &self.inner.store
    }

    pub fn users(&self) -> &InMemoryUserDirectory {
        &self.inner.users
    }
}
