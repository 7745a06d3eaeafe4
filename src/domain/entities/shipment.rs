use crate::domain::value_objects::{
    DocumentId, HandlerRole, PackageCondition, Revision, ShipmentChanges, ShipmentStatus,
    Versioned,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A shipment document as stored remotely and in the local snapshot.
///
/// Field names follow the document store's JSON layout so the same
/// serialization is used on the wire and in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<Revision>,
    #[serde(default, deserialize_with = "lenient")]
    pub shipment_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub origin: String,
    #[serde(default, deserialize_with = "lenient")]
    pub destination: String,
    #[serde(default, deserialize_with = "lenient")]
    pub handoff_point: String,
    #[serde(default, deserialize_with = "lenient")]
    pub item_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub package_condition: PackageCondition,
    #[serde(default, deserialize_with = "lenient")]
    pub rfid: String,
    #[serde(default, deserialize_with = "lenient")]
    pub status: ShipmentStatus,
    #[serde(default, deserialize_with = "lenient")]
    pub handler_role: HandlerRole,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: String,
    /// Document fields this crate does not model; written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reads a scalar field the way loosely typed documents store it: `null` is
/// empty, numbers and booleans keep their JSON text.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let text = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    };
    Ok(T::from(text))
}

impl Shipment {
    pub fn new(id: DocumentId, shipment_id: impl Into<String>) -> Self {
        Self {
            id,
            revision: None,
            shipment_id: shipment_id.into(),
            origin: String::new(),
            destination: String::new(),
            handoff_point: String::new(),
            item_id: String::new(),
            package_condition: PackageCondition::default(),
            rfid: String::new(),
            status: ShipmentStatus::default(),
            handler_role: HandlerRole::default(),
            timestamp: String::new(),
            extra: Map::new(),
        }
    }

    /// Pairs the shipment with its revision, or `None` when there is no usable baseline.
    pub fn versioned(&self) -> Option<Versioned<&Shipment>> {
        self.revision
            .as_ref()
            .filter(|rev| !rev.as_str().trim().is_empty())
            .map(|rev| Versioned::new(self, rev.clone()))
    }

    pub fn has_revision(&self) -> bool {
        self.versioned().is_some()
    }

    /// Returns a copy with `changes` applied and the timestamp refreshed.
    /// Identity and revision are kept as-is.
    pub fn merged_with(&self, changes: &ShipmentChanges, now: DateTime<Utc>) -> Shipment {
        let mut merged = self.clone();
        if let Some(value) = &changes.shipment_id {
            merged.shipment_id = value.clone();
        }
        if let Some(value) = &changes.origin {
            merged.origin = value.clone();
        }
        if let Some(value) = &changes.destination {
            merged.destination = value.clone();
        }
        if let Some(value) = &changes.handoff_point {
            merged.handoff_point = value.clone();
        }
        if let Some(value) = &changes.item_id {
            merged.item_id = value.clone();
        }
        if let Some(value) = &changes.package_condition {
            merged.package_condition = value.clone();
        }
        if let Some(value) = &changes.rfid {
            merged.rfid = value.clone();
        }
        if let Some(value) = &changes.status {
            merged.status = value.clone();
        }
        if let Some(value) = &changes.handler_role {
            merged.handler_role = value.clone();
        }
        merged.timestamp = format_timestamp(now);
        merged
    }

    /// Parsed `timestamp`; legacy free-form values yield `None`.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
