use super::Shipment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    pub shipments: Vec<Shipment>,
    pub is_online: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub success: bool,
    pub message: String,
    pub updated_shipment: Option<Shipment>,
    /// True when the edit was stored for a later sync instead of written live.
    pub queued: bool,
}

impl UpdateOutcome {
    pub fn applied(shipment: Shipment) -> Self {
        Self {
            success: true,
            message: "Shipment updated successfully!".to_string(),
            updated_shipment: Some(shipment),
            queued: false,
        }
    }

    pub fn queued(shipment: Shipment) -> Self {
        Self {
            success: true,
            message: "You are offline. Update has been queued.".to_string(),
            updated_shipment: Some(shipment),
            queued: true,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            updated_shipment: None,
            queued: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub success: bool,
    pub message: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub dropped: usize,
    pub dead_lettered: usize,
}

impl SyncReport {
    pub fn without_counts(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
            total: 0,
            succeeded: 0,
            failed: 0,
            dropped: 0,
            dead_lettered: 0,
        }
    }
}
