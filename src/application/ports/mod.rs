pub mod key_value_store;
pub mod remote_store;

pub use key_value_store::KeyValueStore;
pub use remote_store::RemoteShipmentStore;
