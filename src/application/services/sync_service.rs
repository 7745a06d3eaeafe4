use super::pending_queue::{PendingUpdateQueue, ReplayHandler};
use super::shipment_cache::ShipmentCache;
use crate::application::ports::RemoteShipmentStore;
use crate::domain::entities::{
    DrainReport, FetchResult, PendingUpdate, ReplayOutcome, Shipment, SyncReport, UpdateOutcome,
};
use crate::domain::value_objects::{DocumentId, ShipmentChanges};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub is_syncing: bool,
    /// Outcome of the latest fetch; `None` before the first one.
    pub is_online: Option<bool>,
    pub last_fetch_at: Option<i64>,
    pub last_sync_at: Option<i64>,
    pub sync_errors: u32,
}

/// Offline-first access to shipments: live reads with cache fallback,
/// live writes with queue fallback, and queue replay on reconnect.
pub struct SyncService {
    remote: Arc<dyn RemoteShipmentStore>,
    cache: ShipmentCache,
    queue: PendingUpdateQueue,
    syncing: Arc<AtomicBool>,
    status: Arc<RwLock<SyncStatus>>,
}

impl SyncService {
    pub fn new(
        remote: Arc<dyn RemoteShipmentStore>,
        cache: ShipmentCache,
        queue: PendingUpdateQueue,
    ) -> Self {
        Self {
            remote,
            cache,
            queue,
            syncing: Arc::new(AtomicBool::new(false)),
            status: Arc::new(RwLock::new(SyncStatus::default())),
        }
    }

    /// Live shipments when the store answers, otherwise the cached snapshot.
    /// Never fails; the `is_online` flag carries the outcome.
    pub async fn fetch_shipments(&self) -> FetchResult {
        match self.remote.list_all().await {
            Ok(shipments) => {
                if let Err(err) = self.cache.save(&shipments).await {
                    warn!(error = %err, "failed to cache live shipments");
                }
                info!(count = shipments.len(), "fetched and cached live shipments");
                self.record_fetch(true).await;
                FetchResult {
                    shipments,
                    is_online: true,
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch live data, falling back to cache");
                self.record_fetch(false).await;
                FetchResult {
                    shipments: self.cache.load().await,
                    is_online: false,
                }
            }
        }
    }

    /// Writes `changes` live, or queues them and returns the optimistic result.
    pub async fn update_shipment(
        &self,
        shipment: &Shipment,
        changes: &ShipmentChanges,
    ) -> UpdateOutcome {
        if !shipment.has_revision() {
            return UpdateOutcome::rejected("Document is missing a revision number.");
        }

        match self.remote.update(shipment, changes).await {
            Ok(updated) => UpdateOutcome::applied(updated),
            Err(err) => {
                warn!(
                    error = %err,
                    document_id = %shipment.id,
                    conflict = err.is_conflict(),
                    "failed to update shipment live"
                );
                match self.queue.enqueue(shipment.id.clone(), changes.clone()).await {
                    Ok(_) => UpdateOutcome::queued(shipment.merged_with(changes, Utc::now())),
                    Err(queue_err) => {
                        error!(error = %queue_err, document_id = %shipment.id, "failed to queue shipment update");
                        UpdateOutcome::rejected(format!("Failed to queue update: {queue_err}"))
                    }
                }
            }
        }
    }

    /// Replays queued edits against freshly fetched revisions.
    ///
    /// Only one pass runs at a time; a request arriving meanwhile is dropped.
    pub async fn sync_pending_updates(&self) -> SyncReport {
        let Some(_busy) = BusyGuard::acquire(&self.syncing) else {
            debug!("sync requested while another sync is running");
            return SyncReport::without_counts(false, "Sync already in progress.");
        };

        let report = self.run_sync().await;

        let mut status = self.status.write().await;
        if report.total > 0 {
            status.last_sync_at = Some(Utc::now().timestamp());
        }
        if report.failed > 0 {
            status.sync_errors = status.sync_errors.saturating_add(1);
        }
        report
    }

    pub async fn pending_count(&self) -> usize {
        self.queue.count().await
    }

    pub async fn pending_updates(&self) -> Vec<PendingUpdate> {
        self.queue.entries().await
    }

    pub async fn dead_letters(&self) -> Vec<PendingUpdate> {
        self.queue.dead_letters().await
    }

    pub async fn cached_shipments(&self) -> Vec<Shipment> {
        self.cache.load().await
    }

    pub async fn status(&self) -> SyncStatus {
        let mut status = self.status.read().await.clone();
        status.is_syncing = self.syncing.load(Ordering::SeqCst);
        status
    }

    async fn run_sync(&self) -> SyncReport {
        let pending = self.queue.count().await;
        if pending == 0 {
            return SyncReport::without_counts(true, "No pending updates to sync.");
        }

        info!(pending, "starting sync of pending updates");

        // Replays must carry the store's current revisions.
        let fresh = self.fetch_shipments().await;
        if !fresh.is_online {
            return SyncReport::without_counts(false, "Cannot sync while offline.");
        }

        let replayer = LatestRevisionReplayer::new(self.remote.as_ref(), fresh.shipments);
        let drained = match self.queue.drain(&replayer).await {
            Ok(report) => report,
            Err(err) => {
                error!(error = %err, "failed to drain pending update queue");
                return SyncReport::without_counts(
                    false,
                    format!("Failed to sync pending updates: {err}"),
                );
            }
        };

        if drained.succeeded > 0 {
            self.fetch_shipments().await;
        }

        summarize(drained)
    }

    async fn record_fetch(&self, is_online: bool) {
        let mut status = self.status.write().await;
        status.is_online = Some(is_online);
        status.last_fetch_at = Some(Utc::now().timestamp());
    }
}

/// A pass succeeds when nothing is left in the queue afterwards. Dead-lettered
/// entries count as failed in the message but no longer block success; entries
/// enqueued while the pass ran keep it from succeeding.
fn summarize(drained: DrainReport) -> SyncReport {
    let mut message = format!(
        "Synced {} of {} updates. {} failed.",
        drained.succeeded, drained.total, drained.failed
    );
    if drained.dead_lettered > 0 {
        message.push_str(&format!(
            " {} moved to dead letter queue.",
            drained.dead_lettered
        ));
    }
    SyncReport {
        success: drained.remaining == 0,
        message,
        total: drained.total,
        succeeded: drained.succeeded,
        failed: drained.failed,
        dropped: drained.dropped,
        dead_lettered: drained.dead_lettered,
    }
}

struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Replays queued edits on top of the latest known version of each document.
/// A successful write refreshes that version, so a second edit to the same
/// document in one pass is based on the first one's revision.
struct LatestRevisionReplayer<'a> {
    remote: &'a dyn RemoteShipmentStore,
    latest: Mutex<HashMap<DocumentId, Shipment>>,
}

impl<'a> LatestRevisionReplayer<'a> {
    fn new(remote: &'a dyn RemoteShipmentStore, shipments: Vec<Shipment>) -> Self {
        let latest = shipments
            .into_iter()
            .map(|shipment| (shipment.id.clone(), shipment))
            .collect();
        Self {
            remote,
            latest: Mutex::new(latest),
        }
    }

    fn lookup(&self, id: &DocumentId) -> Option<Shipment> {
        match self.latest.lock() {
            Ok(latest) => latest.get(id).cloned(),
            Err(poisoned) => poisoned.into_inner().get(id).cloned(),
        }
    }

    fn remember(&self, shipment: Shipment) {
        let mut latest = match self.latest.lock() {
            Ok(latest) => latest,
            Err(poisoned) => poisoned.into_inner(),
        };
        latest.insert(shipment.id.clone(), shipment);
    }
}

#[async_trait]
impl ReplayHandler for LatestRevisionReplayer<'_> {
    async fn replay(&self, update: &PendingUpdate) -> ReplayOutcome {
        let Some(shipment) = self.lookup(&update.document_id) else {
            return ReplayOutcome::NotFound;
        };

        match self.remote.update(&shipment, &update.changes).await {
            Ok(written) => {
                debug!(entry_id = %update.entry_id, document_id = %written.id, "replayed queued update");
                self.remember(written);
                ReplayOutcome::Applied
            }
            Err(err) => {
                warn!(
                    error = %err,
                    entry_id = %update.entry_id,
                    document_id = %update.document_id,
                    "queued update replay failed"
                );
                ReplayOutcome::Failed
            }
        }
    }
}
