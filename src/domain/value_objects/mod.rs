pub mod document_id;
pub mod handler_role;
pub mod package_condition;
pub mod revision;
pub mod shipment_changes;
pub mod shipment_status;
pub mod versioned;

pub use document_id::DocumentId;
pub use handler_role::HandlerRole;
pub use package_condition::PackageCondition;
pub use revision::Revision;
pub use shipment_changes::ShipmentChanges;
pub use shipment_status::ShipmentStatus;
pub use versioned::Versioned;
