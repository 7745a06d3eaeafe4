//! Read-only views over a shipment list, as shown on the role dashboards.

use crate::domain::entities::Shipment;
use crate::domain::value_objects::{HandlerRole, ShipmentStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerRole {
    Driver,
    DockWorker,
    WarehouseManager,
}

impl ViewerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driver => "driver",
            Self::DockWorker => "dock_worker",
            Self::WarehouseManager => "warehouse_manager",
        }
    }

    fn sees(&self, shipment: &Shipment) -> bool {
        match self {
            Self::Driver => shipment.handler_role == HandlerRole::Driver,
            Self::DockWorker => shipment.handler_role == HandlerRole::DockWorker,
            Self::WarehouseManager => true,
        }
    }
}

impl fmt::Display for ViewerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "driver" => Ok(Self::Driver),
            "dock_worker" => Ok(Self::DockWorker),
            "warehouse_manager" | "manager" => Ok(Self::WarehouseManager),
            other => Err(format!("unknown viewer role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    ShipmentId,
    Rfid,
    ItemId,
    Origin,
    Destination,
}

impl SearchField {
    fn value<'a>(&self, shipment: &'a Shipment) -> &'a str {
        match self {
            Self::ShipmentId => &shipment.shipment_id,
            Self::Rfid => &shipment.rfid,
            Self::ItemId => &shipment.item_id,
            Self::Origin => &shipment.origin,
            Self::Destination => &shipment.destination,
        }
    }
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "shipment_id" | "id" => Ok(Self::ShipmentId),
            "rfid" => Ok(Self::Rfid),
            "item_id" | "item" => Ok(Self::ItemId),
            "origin" => Ok(Self::Origin),
            "destination" => Ok(Self::Destination),
            other => Err(format!("unknown search field: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total: usize,
    pub in_transit: usize,
    pub delayed: usize,
    pub delivered: usize,
    /// Counts keyed by raw status value, unknown values included.
    pub by_status: BTreeMap<String, usize>,
}

pub fn shipments_for_role(shipments: &[Shipment], role: ViewerRole) -> Vec<Shipment> {
    shipments
        .iter()
        .filter(|shipment| role.sees(shipment))
        .cloned()
        .collect()
}

pub fn status_summary(shipments: &[Shipment]) -> StatusSummary {
    let mut summary = StatusSummary {
        total: shipments.len(),
        ..StatusSummary::default()
    };
    for shipment in shipments {
        match shipment.status {
            ShipmentStatus::InTransit => summary.in_transit += 1,
            ShipmentStatus::Delayed => summary.delayed += 1,
            ShipmentStatus::Delivered => summary.delivered += 1,
            _ => {}
        }
        *summary
            .by_status
            .entry(shipment.status.as_str().to_string())
            .or_insert(0) += 1;
    }
    summary
}

/// Case-insensitive substring match on one field. A blank term matches everything.
pub fn search(shipments: &[Shipment], field: SearchField, term: &str) -> Vec<Shipment> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return shipments.to_vec();
    }
    shipments
        .iter()
        .filter(|shipment| field.value(shipment).to_lowercase().contains(&term))
        .cloned()
        .collect()
}

pub fn filter_by_status(shipments: &[Shipment], status: Option<&ShipmentStatus>) -> Vec<Shipment> {
    match status {
        None => shipments.to_vec(),
        Some(status) => shipments
            .iter()
            .filter(|shipment| &shipment.status == status)
            .cloned()
            .collect(),
    }
}

/// Distinct statuses in first-seen order.
pub fn unique_statuses(shipments: &[Shipment]) -> Vec<ShipmentStatus> {
    let mut seen = HashSet::new();
    shipments
        .iter()
        .filter(|shipment| seen.insert(&shipment.status))
        .map(|shipment| shipment.status.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::DocumentId;

    fn shipment(id: &str, role: HandlerRole, status: &str, rfid: &str) -> Shipment {
        let mut shipment = Shipment::new(DocumentId::new(id).unwrap(), id);
        shipment.handler_role = role;
        shipment.status = ShipmentStatus::from(status);
        shipment.rfid = rfid.to_string();
        shipment
    }

    fn fleet() -> Vec<Shipment> {
        vec![
            shipment("73", HandlerRole::WarehouseStaff, "delayed", "494D8SCTNM"),
            shipment("437", HandlerRole::Driver, "delivered", "59U63J786Z"),
            shipment("733", HandlerRole::DockWorker, "in_transit", "0T90T1UO7Z"),
            shipment("875", HandlerRole::Driver, "in_transit", "E850OQ572U"),
            shipment("550", HandlerRole::Driver, "lost_at_sea", "OKKHW0ET5A"),
        ]
    }

    #[test]
    fn roles_see_their_own_shipments() {
        let all = fleet();
        let ids = |role| {
            shipments_for_role(&all, role)
                .into_iter()
                .map(|s| s.shipment_id)
                .collect::<Vec<_>>()
        };

        assert_eq!(ids(ViewerRole::Driver), vec!["437", "875", "550"]);
        assert_eq!(ids(ViewerRole::DockWorker), vec!["733"]);
        assert_eq!(ids(ViewerRole::WarehouseManager).len(), 5);
    }

    #[test]
    fn summary_counts_known_and_unknown_statuses() {
        let summary = status_summary(&fleet());

        assert_eq!(summary.total, 5);
        assert_eq!(summary.in_transit, 2);
        assert_eq!(summary.delayed, 1);
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.by_status.get("lost_at_sea"), Some(&1));
        assert_eq!(summary.by_status.values().sum::<usize>(), 5);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let all = fleet();
        let found = search(&all, SearchField::Rfid, "t90t");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].shipment_id, "733");

        assert_eq!(search(&all, SearchField::ShipmentId, "  ").len(), 5);
        assert!(search(&all, SearchField::Origin, "nowhere").is_empty());
    }

    #[test]
    fn status_filter_and_unique_statuses() {
        let all = fleet();
        let in_transit = filter_by_status(&all, Some(&ShipmentStatus::InTransit));
        assert_eq!(in_transit.len(), 2);
        assert_eq!(filter_by_status(&all, None).len(), 5);

        let statuses = unique_statuses(&all);
        assert_eq!(
            statuses,
            vec![
                ShipmentStatus::Delayed,
                ShipmentStatus::Delivered,
                ShipmentStatus::InTransit,
                ShipmentStatus::Unknown("lost_at_sea".to_string()),
            ]
        );
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!("dock-worker".parse::<ViewerRole>(), Ok(ViewerRole::DockWorker));
        assert_eq!("RFID".parse::<SearchField>(), Ok(SearchField::Rfid));
        assert!("pilot".parse::<ViewerRole>().is_err());
    }
}
