use super::sync_service::SyncService;
use crate::domain::entities::SyncReport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Runs a sync every time `online` flips from `false` to `true`.
///
/// The task ends when the sender side is dropped.
pub fn spawn_reconnect_sync(
    service: Arc<SyncService>,
    mut online: watch::Receiver<bool>,
) -> JoinHandle<()> {
    // Baseline is taken before spawning so a flip racing the first poll is still seen.
    let mut was_online = *online.borrow_and_update();

    tokio::spawn(async move {
        while online.changed().await.is_ok() {
            let is_online = *online.borrow_and_update();
            if is_online && !was_online {
                info!("connectivity restored, syncing pending updates");
                log_report(&service.sync_pending_updates().await);
            } else if !is_online && was_online {
                info!("connectivity lost");
            }
            was_online = is_online;
        }

        debug!("connectivity channel closed");
    })
}

/// Periodic sync loop. The first pass runs immediately.
pub fn schedule_sync(service: Arc<SyncService>, interval: Duration) -> JoinHandle<()> {
    let period = interval.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            log_report(&service.sync_pending_updates().await);
        }
    })
}

fn log_report(report: &SyncReport) {
    if report.success {
        info!(
            succeeded = report.succeeded,
            total = report.total,
            "{}",
            report.message
        );
    } else {
        warn!(
            failed = report.failed,
            total = report.total,
            "{}",
            report.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::RemoteShipmentStore;
    use crate::application::services::{PendingUpdateQueue, ShipmentCache};
    use crate::domain::entities::Shipment;
    use crate::domain::value_objects::{DocumentId, Revision, ShipmentChanges, ShipmentStatus};
    use crate::infrastructure::storage::MemoryKeyValueStore;
    use crate::shared::error::StoreError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// One-document store that can be switched off.
    struct SwitchableRemote {
        reachable: AtomicBool,
        writes: AtomicUsize,
        current: Shipment,
    }

    impl SwitchableRemote {
        fn new() -> Self {
            let mut current = Shipment::new(DocumentId::new("42").unwrap(), "733");
            current.revision = Some(Revision::new("1-abc").unwrap());
            current.status = ShipmentStatus::InTransit;
            Self {
                reachable: AtomicBool::new(false),
                writes: AtomicUsize::new(0),
                current,
            }
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.reachable.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(StoreError::Network("unreachable".to_string()))
            }
        }
    }

    #[async_trait]
    impl RemoteShipmentStore for SwitchableRemote {
        async fn list_all(&self) -> Result<Vec<Shipment>, StoreError> {
            self.check()?;
            Ok(vec![self.current.clone()])
        }

        async fn update(
            &self,
            shipment: &Shipment,
            changes: &ShipmentChanges,
        ) -> Result<Shipment, StoreError> {
            self.check()?;
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut written = shipment.merged_with(changes, chrono::Utc::now());
            written.revision = Some(Revision::new("2-def").unwrap());
            Ok(written)
        }
    }

    async fn queued_service(remote: Arc<SwitchableRemote>) -> Arc<SyncService> {
        let store = Arc::new(MemoryKeyValueStore::new());
        let service = Arc::new(SyncService::new(
            remote.clone(),
            ShipmentCache::new(store.clone(), "snapshot"),
            PendingUpdateQueue::new(store, "queue", "dead"),
        ));
        let outcome = service
            .update_shipment(
                &remote.current,
                &ShipmentChanges::new().status(ShipmentStatus::Delivered),
            )
            .await;
        assert!(outcome.queued);
        service
    }

    async fn wait_for_empty_queue(service: &SyncService) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while service.pending_count().await > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("queue was not drained in time");
    }

    #[tokio::test]
    async fn reconnect_triggers_sync() {
        let remote = Arc::new(SwitchableRemote::new());
        let service = queued_service(remote.clone()).await;
        let (tx, rx) = watch::channel(false);
        let handle = spawn_reconnect_sync(service.clone(), rx);

        remote.reachable.store(true, Ordering::SeqCst);
        tx.send(true).unwrap();
        wait_for_empty_queue(&service).await;

        drop(tx);
        handle.await.unwrap();
        assert_eq!(remote.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn staying_online_does_not_sync() {
        let remote = Arc::new(SwitchableRemote::new());
        let service = queued_service(remote.clone()).await;
        remote.reachable.store(true, Ordering::SeqCst);

        let (tx, rx) = watch::channel(true);
        let handle = spawn_reconnect_sync(service.clone(), rx);
        tx.send(true).unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(service.pending_count().await, 1);
        assert_eq!(remote.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scheduled_sync_drains_queue() {
        let remote = Arc::new(SwitchableRemote::new());
        let service = queued_service(remote.clone()).await;
        remote.reachable.store(true, Ordering::SeqCst);

        let handle = schedule_sync(service.clone(), Duration::from_secs(1));
        wait_for_empty_queue(&service).await;
        handle.abort();

        assert_eq!(remote.writes.load(Ordering::SeqCst), 1);
    }
}
