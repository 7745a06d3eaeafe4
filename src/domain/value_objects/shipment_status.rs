use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShipmentStatus {
    PickedUp,
    InTransit,
    Delayed,
    Delivered,
    /// Value written by another client that this build does not know about.
    Unknown(String),
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ShipmentStatus::PickedUp => "picked_up",
            ShipmentStatus::InTransit => "in_transit",
            ShipmentStatus::Delayed => "delayed",
            ShipmentStatus::Delivered => "delivered",
            ShipmentStatus::Unknown(value) => value.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ShipmentStatus::Unknown(_))
    }
}

/// Missing or blank values read as `Unknown("")`.
impl Default for ShipmentStatus {
    fn default() -> Self {
        ShipmentStatus::Unknown(String::new())
    }
}

impl From<&str> for ShipmentStatus {
    fn from(value: &str) -> Self {
        match value {
            "picked_up" => ShipmentStatus::PickedUp,
            "in_transit" => ShipmentStatus::InTransit,
            "delayed" => ShipmentStatus::Delayed,
            "delivered" => ShipmentStatus::Delivered,
            other => ShipmentStatus::Unknown(other.to_string()),
        }
    }
}

impl From<String> for ShipmentStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ShipmentStatus> for String {
    fn from(value: ShipmentStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
