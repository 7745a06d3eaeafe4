use crate::domain::value_objects::{DocumentId, ShipmentChanges};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An edit that could not be written live and waits for the next sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingUpdate {
    pub entry_id: Uuid,
    pub document_id: DocumentId,
    pub changes: ShipmentChanges,
    pub queued_at: DateTime<Utc>,
    /// Failed replays so far.
    #[serde(default)]
    pub attempts: u32,
}

impl PendingUpdate {
    pub fn new(document_id: DocumentId, changes: ShipmentChanges) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            document_id,
            changes,
            queued_at: Utc::now(),
            attempts: 0,
        }
    }
}

/// Result of replaying one queued entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOutcome {
    Applied,
    Failed,
    NotFound,
}

/// Counts from one pass over the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub dropped: usize,
    pub dead_lettered: usize,
    pub remaining: usize,
}
