//! Notification Context
//!
//! Holds the application's store so consumers can reach it without a global.
//! Asking for the store before one was installed is a configuration error
//! and fails immediately.

use std::sync::OnceLock;

use crate::notifications::error::{NotificationError, NotificationResult};
use crate::notifications::store::NotificationStore;

#[derive(Debug, Default)]
pub struct NotificationContext {
    store: OnceLock<NotificationStore>,
}

impl NotificationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with its store already installed
    pub fn with_store(store: NotificationStore) -> Self {
        let context = Self::new();
        // A fresh OnceLock always accepts its first value
        let _ = context.store.set(store);
        context
    }

    /// Install the store; only the first call succeeds
    pub fn install(&self, store: NotificationStore) -> NotificationResult<()> {
        self.store
            .set(store)
            .map_err(|_| NotificationError::AlreadyInitialized)
    }

    /// The installed store
    pub fn store(&self) -> NotificationResult<&NotificationStore> {
        self.store.get().ok_or(NotificationError::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.store.get().is_some()
    }

    /// Shut down the installed store, if any
    pub fn shutdown(&self) {
        if let Some(store) = self.store.get() {
            store.shutdown();
        }
    }
}
