use super::{HandlerRole, PackageCondition, ShipmentStatus};
use serde::{Deserialize, Serialize};

/// Partial edit to a shipment.
///
/// Identity (`_id`) and revision (`_rev`) are not representable here, so a
/// queued edit can never carry a stale baseline. `timestamp` is not editable
/// either; it is refreshed whenever an edit is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShipmentChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_condition: Option<PackageCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rfid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ShipmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler_role: Option<HandlerRole>,
}

impl ShipmentChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: ShipmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn package_condition(mut self, condition: PackageCondition) -> Self {
        self.package_condition = Some(condition);
        self
    }

    pub fn handoff_point(mut self, handoff_point: impl Into<String>) -> Self {
        self.handoff_point = Some(handoff_point.into());
        self
    }

    pub fn handler_role(mut self, role: HandlerRole) -> Self {
        self.handler_role = Some(role);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
