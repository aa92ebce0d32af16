// Stateless service layers over the persistent store

pub mod counter;
pub mod guild_config;

use std::sync::Arc;

use crate::storage::{Store, StoreError};

pub use counter::CounterService;
pub use guild_config::GuildConfigStore;

/// Run a blocking store call on tokio's blocking pool
async fn run_blocking<S, T, F>(store: &Arc<S>, f: F) -> Result<T, StoreError>
where
    S: Store,
    T: Send + 'static,
    F: FnOnce(&S) -> Result<T, StoreError> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| StoreError::Unavailable(format!("store task failed: {}", e)))?
}
