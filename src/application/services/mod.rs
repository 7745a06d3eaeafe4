pub mod connectivity;
pub mod dashboard;
pub mod pending_queue;
pub mod shipment_cache;
pub mod sync_service;

pub use connectivity::{schedule_sync, spawn_reconnect_sync};
pub use pending_queue::{PendingUpdateQueue, ReplayHandler};
pub use shipment_cache::{CachedSnapshot, ShipmentCache};
pub use sync_service::{SyncService, SyncStatus};
