use crate::application::ports::KeyValueStore;
use crate::domain::entities::Shipment;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Last successful fetch, stored as one blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSnapshot {
    pub shipments: Vec<Shipment>,
    pub saved_at: DateTime<Utc>,
}

/// Local snapshot cache. Every save replaces the whole snapshot.
#[derive(Clone)]
pub struct ShipmentCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl ShipmentCache {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub async fn save(&self, shipments: &[Shipment]) -> Result<(), AppError> {
        let snapshot = CachedSnapshot {
            shipments: shipments.to_vec(),
            saved_at: Utc::now(),
        };
        let json = serde_json::to_string(&snapshot)?;
        self.store.set(&self.key, &json).await
    }

    /// Cached shipments, or an empty list when nothing usable is stored.
    pub async fn load(&self) -> Vec<Shipment> {
        self.load_snapshot()
            .await
            .map(|snapshot| snapshot.shipments)
            .unwrap_or_default()
    }

    pub async fn load_snapshot(&self) -> Option<CachedSnapshot> {
        let raw = match self.store.get(&self.key).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(error = %err, key = %self.key, "failed to read shipment cache");
                return None;
            }
        };

        match serde_json::from_str::<CachedSnapshot>(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(error = %err, key = %self.key, "discarding unreadable shipment cache");
                None
            }
        }
    }
}
