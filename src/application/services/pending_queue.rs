use crate::application::ports::KeyValueStore;
use crate::domain::entities::{DrainReport, PendingUpdate, ReplayOutcome};
use crate::domain::value_objects::{DocumentId, ShipmentChanges};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Replays one queued edit against the remote store.
#[async_trait]
pub trait ReplayHandler: Send + Sync {
    async fn replay(&self, update: &PendingUpdate) -> ReplayOutcome;
}

/// Persistent FIFO of edits waiting to be written to the remote store.
///
/// Entries are never coalesced: two edits to the same document are replayed
/// separately, oldest first.
#[derive(Clone)]
pub struct PendingUpdateQueue {
    store: Arc<dyn KeyValueStore>,
    queue_key: String,
    dead_letter_key: String,
    max_attempts: Option<u32>,
    gate: Arc<Mutex<()>>,
}

impl PendingUpdateQueue {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        queue_key: impl Into<String>,
        dead_letter_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            queue_key: queue_key.into(),
            dead_letter_key: dead_letter_key.into(),
            max_attempts: None,
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Caps failed replays per entry; capped entries move to the dead-letter list.
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts.filter(|value| *value > 0);
        self
    }

    pub async fn enqueue(
        &self,
        document_id: DocumentId,
        changes: ShipmentChanges,
    ) -> Result<PendingUpdate, AppError> {
        let entry = PendingUpdate::new(document_id, changes);

        let _guard = self.gate.lock().await;
        let mut queue = self.read(&self.queue_key).await?;
        queue.push(entry.clone());
        self.write(&self.queue_key, &queue).await?;

        info!(
            entry_id = %entry.entry_id,
            document_id = %entry.document_id,
            pending = queue.len(),
            "queued shipment update for sync"
        );
        Ok(entry)
    }

    pub async fn count(&self) -> usize {
        self.entries().await.len()
    }

    /// Queue contents in replay order. Unreadable queues read as empty.
    pub async fn entries(&self) -> Vec<PendingUpdate> {
        match self.read(&self.queue_key).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, key = %self.queue_key, "failed to read pending update queue");
                Vec::new()
            }
        }
    }

    pub async fn dead_letters(&self) -> Vec<PendingUpdate> {
        match self.read(&self.dead_letter_key).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, key = %self.dead_letter_key, "failed to read dead letter queue");
                Vec::new()
            }
        }
    }

    /// Replays every queued entry once, oldest first.
    ///
    /// Applied entries are removed, failed ones stay (or are dead-lettered once
    /// the attempt cap is hit), not-found ones are dropped. Entries enqueued
    /// while the replay runs are kept behind the remaining ones.
    pub async fn drain(&self, handler: &dyn ReplayHandler) -> Result<DrainReport, AppError> {
        let snapshot = {
            let _guard = self.gate.lock().await;
            self.read(&self.queue_key).await?
        };

        let mut report = DrainReport {
            total: snapshot.len(),
            ..DrainReport::default()
        };
        if snapshot.is_empty() {
            return Ok(report);
        }

        let replayed: HashSet<Uuid> = snapshot.iter().map(|entry| entry.entry_id).collect();
        let mut remaining = Vec::new();
        let mut dead = Vec::new();

        for mut entry in snapshot {
            match handler.replay(&entry).await {
                ReplayOutcome::Applied => report.succeeded += 1,
                ReplayOutcome::NotFound => {
                    warn!(
                        entry_id = %entry.entry_id,
                        document_id = %entry.document_id,
                        "cannot find shipment for queued update, dropping it"
                    );
                    report.dropped += 1;
                }
                ReplayOutcome::Failed => {
                    report.failed += 1;
                    entry.attempts = entry.attempts.saturating_add(1);
                    if self.max_attempts.is_some_and(|cap| entry.attempts >= cap) {
                        warn!(
                            entry_id = %entry.entry_id,
                            document_id = %entry.document_id,
                            attempts = entry.attempts,
                            "queued update exhausted its retries, moving to dead letter queue"
                        );
                        dead.push(entry);
                    } else {
                        remaining.push(entry);
                    }
                }
            }
        }

        let _guard = self.gate.lock().await;
        let current = self.read(&self.queue_key).await?;
        remaining.extend(
            current
                .into_iter()
                .filter(|entry| !replayed.contains(&entry.entry_id)),
        );

        // Dead letters are written first; if that fails the queue is untouched.
        if !dead.is_empty() {
            report.dead_lettered = dead.len();
            let mut letters = self.read(&self.dead_letter_key).await?;
            letters.extend(dead);
            self.write(&self.dead_letter_key, &letters).await?;
        }
        self.write(&self.queue_key, &remaining).await?;

        report.remaining = remaining.len();
        info!(
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            dropped = report.dropped,
            dead_lettered = report.dead_lettered,
            remaining = report.remaining,
            "pending update queue drained"
        );
        Ok(report)
    }

    async fn read(&self, key: &str) -> Result<Vec<PendingUpdate>, AppError> {
        match self.store.get(key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn write(&self, key: &str, entries: &[PendingUpdate]) -> Result<(), AppError> {
        let json = serde_json::to_string(entries)?;
        self.store.set(key, &json).await
    }
}
