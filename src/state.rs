use crate::application::services::{PendingUpdateQueue, ShipmentCache, SyncService};
use crate::infrastructure::remote::CouchShipmentStore;
use crate::infrastructure::storage::SqliteKeyValueStore;
use crate::shared::config::AppConfig;
use crate::shared::error::{AppError, Result};
use std::sync::Arc;
use tracing::info;

/// Wired-up services for one process.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<SqliteKeyValueStore>,
    pub sync_service: Arc<SyncService>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        config.validate().map_err(AppError::Configuration)?;

        let store = Arc::new(SqliteKeyValueStore::connect(&config.storage.database_url).await?);
        let remote = Arc::new(CouchShipmentStore::new(&config.remote)?);

        let cache = ShipmentCache::new(store.clone(), config.storage.snapshot_key.clone());
        let queue = PendingUpdateQueue::new(
            store.clone(),
            config.storage.queue_key.clone(),
            config.storage.dead_letter_key.clone(),
        )
        .with_max_attempts(config.sync.max_attempts);

        let sync_service = Arc::new(SyncService::new(remote, cache, queue));

        info!(remote = %config.remote.base_url, "application state initialized");

        Ok(Self {
            config,
            store,
            sync_service,
        })
    }

    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}
