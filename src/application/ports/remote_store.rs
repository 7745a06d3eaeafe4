use crate::domain::entities::Shipment;
use crate::domain::value_objects::ShipmentChanges;
use crate::shared::error::StoreError;
use async_trait::async_trait;

/// Remote shipment document store.
#[async_trait]
pub trait RemoteShipmentStore: Send + Sync {
    /// Every shipment document, in store order.
    async fn list_all(&self) -> Result<Vec<Shipment>, StoreError>;

    /// Conditional write of `shipment` merged with `changes`.
    ///
    /// Fails with [`StoreError::MissingRevision`] before any I/O when the
    /// shipment has no revision. A stale revision comes back as a 409
    /// [`StoreError::Api`] and is not retried.
    async fn update(
        &self,
        shipment: &Shipment,
        changes: &ShipmentChanges,
    ) -> Result<Shipment, StoreError>;
}
