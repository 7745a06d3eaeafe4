use crate::shared::error::AppError;
use async_trait::async_trait;

/// Persistent string key-value area backing the snapshot cache and the update queue.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}
