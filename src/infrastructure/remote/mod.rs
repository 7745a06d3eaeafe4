pub mod couch_client;
pub mod wire;

pub use couch_client::CouchShipmentStore;
