// Guild configuration store
// Every read merges the stored overrides onto DEFAULT_CONFIG, so new default
// fields reach existing guilds without a migration.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::run_blocking;
use crate::models::guild::{ConfigMap, ConfigValue, GuildConfig, DEFAULT_CONFIG};
use crate::storage::{Store, StoreError};
use crate::utils::merge::{deep_merge, retain_known};

pub struct GuildConfigStore<S> {
    store: Arc<S>,
}

impl<S> Clone for GuildConfigStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> GuildConfigStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Effective configuration for a guild.
    ///
    /// Never fails: a missing scope, an unreachable store or a corrupted row
    /// all log and yield the defaults. Never writes.
    pub async fn get_config(&self, scope: &str) -> GuildConfig {
        if scope.trim().is_empty() {
            warn!("get_config called without a guild id, returning defaults");
            return GuildConfig::defaults();
        }

        match self.load_effective(scope).await {
            Ok(config) => config,
            Err(StoreError::Serialization(e)) => {
                warn!(guild_id = %scope, "Stored guild config is malformed, using defaults: {}", e);
                GuildConfig::defaults()
            }
            Err(e) => {
                error!(guild_id = %scope, "Failed to get guild config: {}", e);
                GuildConfig::defaults()
            }
        }
    }

    /// Persist a complete document, replacing whatever was stored
    pub async fn set_config(&self, scope: &str, config: &GuildConfig) -> Result<(), StoreError> {
        require_scope(scope)?;

        let owned_scope = scope.to_string();
        let document = config.to_value();
        let result = run_blocking(&self.store, move |store| {
            store.put_document(&owned_scope, &document)
        })
        .await;

        match &result {
            Ok(()) => info!(guild_id = %scope, "Guild config saved"),
            Err(e) => error!(guild_id = %scope, "Failed to save guild config: {}", e),
        }
        result
    }

    /// Deep-merge `partial` onto the current effective config and persist it.
    ///
    /// Only fields named in `partial` change; nested sections merge field by
    /// field and lists are replaced. Keys unknown to the default template
    /// are dropped. Concurrent updates to one guild are last-writer-wins.
    pub async fn update_config(
        &self,
        scope: &str,
        partial: ConfigMap,
    ) -> Result<GuildConfig, StoreError> {
        require_scope(scope)?;

        let (known, dropped) = retain_known(&partial, DEFAULT_CONFIG.as_map());
        if !dropped.is_empty() {
            warn!(guild_id = %scope, "Ignoring unknown config keys: {}", dropped.join(", "));
        }

        // Strict read: a failed or corrupted read must not be overwritten with defaults
        let current = self.load_effective(scope).await?;
        let merged = GuildConfig::from_map(deep_merge(current.as_map(), &known));
        self.set_config(scope, &merged).await?;
        Ok(merged)
    }

    /// Restore every default section (embeds, labels) while keeping
    /// top-level settings such as the support role and categories
    pub async fn reset_sections(&self, scope: &str) -> Result<GuildConfig, StoreError> {
        require_scope(scope)?;

        // Sections are replaced, not merged, so extra fields inside them go too
        let sections: ConfigMap = DEFAULT_CONFIG
            .as_map()
            .iter()
            .filter(|(_, value)| matches!(value, ConfigValue::Map(_)))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let current = self.load_effective(scope).await?;
        let mut reset = current.into_map();
        reset.extend(sections);
        let reset = GuildConfig::from_map(reset);
        self.set_config(scope, &reset).await?;
        Ok(reset)
    }

    async fn load_effective(&self, scope: &str) -> Result<GuildConfig, StoreError> {
        let owned_scope = scope.to_string();
        let stored = run_blocking(&self.store, move |store| store.get_document(&owned_scope)).await?;

        let Some(stored) = stored else {
            return Ok(GuildConfig::defaults());
        };
        let stored = GuildConfig::from_value(stored).ok_or_else(|| {
            StoreError::Serialization("stored guild config is not a JSON object".to_string())
        })?;

        Ok(GuildConfig::from_map(deep_merge(
            DEFAULT_CONFIG.as_map(),
            stored.as_map(),
        )))
    }
}

fn require_scope(scope: &str) -> Result<(), StoreError> {
    if scope.trim().is_empty() {
        return Err(StoreError::InvalidArgument("guild id is required".to_string()));
    }
    Ok(())
}
