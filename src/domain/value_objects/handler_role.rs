use serde::{Deserialize, Serialize};
use std::fmt;

/// Who currently holds a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HandlerRole {
    Driver,
    DockWorker,
    WarehouseStaff,
    Unknown(String),
}

impl HandlerRole {
    pub fn as_str(&self) -> &str {
        match self {
            HandlerRole::Driver => "driver",
            HandlerRole::DockWorker => "dock_worker",
            HandlerRole::WarehouseStaff => "warehouse_staff",
            HandlerRole::Unknown(value) => value.as_str(),
        }
    }
}

impl Default for HandlerRole {
    fn default() -> Self {
        HandlerRole::Unknown(String::new())
    }
}

impl From<&str> for HandlerRole {
    fn from(value: &str) -> Self {
        match value {
            "driver" => HandlerRole::Driver,
            "dock_worker" => HandlerRole::DockWorker,
            "warehouse_staff" => HandlerRole::WarehouseStaff,
            other => HandlerRole::Unknown(other.to_string()),
        }
    }
}

impl From<String> for HandlerRole {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<HandlerRole> for String {
    fn from(value: HandlerRole) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for HandlerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
