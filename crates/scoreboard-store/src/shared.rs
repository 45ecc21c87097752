//! Guarded single-instance access to a [`ScoreStore`].
//!
//! [`SharedStore`] opens the store on first use and hands every caller the
//! same `Arc`. Opening happens under the write lock, so concurrent first
//! accessors wait for the winner instead of opening a second connection.
//! A failed open leaves the slot empty and the next access retries.
//!
//! The [`global`] functions wrap one process-wide `SharedStore` for hosts
//! that cannot thread a handle through their call graph.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::store::ScoreStore;

pub struct SharedStore {
    config: StoreConfig,
    slot: RwLock<Option<Arc<ScoreStore>>>,
}

impl SharedStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            slot: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get the live store, opening it on first access.
    pub fn get(&self) -> Result<Arc<ScoreStore>, StoreError> {
        // Fast path: read lock
        if let Some(store) = self.slot.read().as_ref() {
            return Ok(Arc::clone(store));
        }

        // Slow path: first access, take write lock
        let mut slot = self.slot.write();
        // Double-check after acquiring write lock (another thread may have opened it)
        if let Some(store) = slot.as_ref() {
            return Ok(Arc::clone(store));
        }

        match ScoreStore::open(&self.config) {
            Ok(store) => {
                let store = Arc::new(store);
                *slot = Some(Arc::clone(&store));
                Ok(store)
            }
            Err(e) => {
                error!(error = %e, "failed to initialize score database");
                Err(e)
            }
        }
    }

    /// The live store, if one has been opened. Never opens.
    pub fn current(&self) -> Option<Arc<ScoreStore>> {
        self.slot.read().clone()
    }

    /// Release the store. No-op if it was never opened or is already closed.
    ///
    /// Outstanding `Arc`s stay valid but every operation on them reports
    /// [`StoreError::Closed`].
    pub fn close(&self) {
        let taken = self.slot.write().take();
        match taken {
            Some(store) => {
                store.close();
                info!(path = %store.path().display(), "shared score store released");
            }
            None => debug!("shared score store close requested with nothing open"),
        }
    }
}

/// Process-wide accessor.
pub mod global {
    use std::sync::Arc;

    use parking_lot::RwLock;

    use super::SharedStore;
    use crate::config::StoreConfig;
    use crate::error::StoreError;
    use crate::store::ScoreStore;

    static GLOBAL: RwLock<Option<Arc<SharedStore>>> = parking_lot::const_rwlock(None);

    /// Install the configuration used by the first [`store`] call.
    ///
    /// Replacing the configuration closes the previous store, if any.
    pub fn configure(config: StoreConfig) {
        let previous = GLOBAL.write().replace(Arc::new(SharedStore::new(config)));
        if let Some(previous) = previous {
            previous.close();
        }
    }

    fn shared() -> Arc<SharedStore> {
        if let Some(shared) = GLOBAL.read().as_ref() {
            return Arc::clone(shared);
        }
        let mut guard = GLOBAL.write();
        Arc::clone(guard.get_or_insert_with(|| Arc::new(SharedStore::new(StoreConfig::from_env()))))
    }

    /// The process-wide store, opened on first use.
    ///
    /// Without a prior [`configure`], the configuration comes from
    /// [`StoreConfig::from_env`].
    pub fn store() -> Result<Arc<ScoreStore>, StoreError> {
        shared().get()
    }

    /// Release the process-wide store. Call once at shutdown, after in-flight
    /// calls have drained.
    pub fn shutdown() {
        let current = GLOBAL.read().clone();
        if let Some(shared) = current {
            shared.close();
        }
    }
}
