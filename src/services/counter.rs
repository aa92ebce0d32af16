// Ticket numbering per (guild, purpose)

use std::sync::Arc;

use tracing::error;

use super::run_blocking;
use crate::storage::{Store, StoreError};

/// Issues monotonically increasing numbers per `(scope, key)`.
///
/// All atomicity lives in [`Store::next_counter`]; this layer only checks
/// its inputs.
pub struct CounterService<S> {
    store: Arc<S>,
}

impl<S> Clone for CounterService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> CounterService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Next number for `key` within `scope`, starting at 1
    pub async fn next(&self, scope: &str, key: &str) -> Result<u64, StoreError> {
        if scope.trim().is_empty() {
            return Err(StoreError::InvalidArgument("scope is required".to_string()));
        }
        if key.trim().is_empty() {
            return Err(StoreError::InvalidArgument("key is required".to_string()));
        }

        let (owned_scope, owned_key) = (scope.to_string(), key.to_string());
        let result = run_blocking(&self.store, move |store| {
            store.next_counter(&owned_scope, &owned_key)
        })
        .await;

        if let Err(e) = &result {
            error!(guild_id = %scope, key = %key, "Failed to get next ticket number: {}", e);
        }
        result
    }
}
