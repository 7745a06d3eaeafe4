pub mod pending_update;
pub mod shipment;
pub mod sync_report;

pub use pending_update::{DrainReport, PendingUpdate, ReplayOutcome};
pub use shipment::{Shipment, format_timestamp};
pub use sync_report::{FetchResult, SyncReport, UpdateOutcome};
