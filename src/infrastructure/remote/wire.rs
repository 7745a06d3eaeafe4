use crate::domain::entities::Shipment;
use crate::shared::error::StoreError;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Reply to a successful document write.
#[derive(Debug, Deserialize)]
pub struct WriteResponse {
    pub id: String,
    pub rev: String,
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ErrorBody {
    pub fn describe(&self) -> Option<String> {
        match (&self.reason, &self.error) {
            (Some(reason), _) if !reason.trim().is_empty() => Some(reason.clone()),
            (_, Some(error)) if !error.trim().is_empty() => Some(error.clone()),
            _ => None,
        }
    }
}

/// Decodes an `_all_docs?include_docs=true` body into shipments.
///
/// Rows without a document or without a non-empty string `shipment_id` are
/// design documents or other records and are skipped.
pub fn parse_all_docs(body: Value) -> Result<Vec<Shipment>, StoreError> {
    let rows = match body {
        Value::Object(mut map) => match map.remove("rows") {
            Some(Value::Array(rows)) => rows,
            Some(_) => {
                return Err(StoreError::MalformedResponse(
                    "\"rows\" property is not an array".to_string(),
                ));
            }
            None => {
                return Err(StoreError::MalformedResponse(
                    "API response is missing the \"rows\" property".to_string(),
                ));
            }
        },
        _ => {
            return Err(StoreError::MalformedResponse(
                "API response is not a JSON object".to_string(),
            ));
        }
    };

    let mut shipments = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(shipment) = parse_row(row) {
            shipments.push(shipment);
        }
    }
    Ok(shipments)
}

fn parse_row(row: Value) -> Option<Shipment> {
    let Value::Object(mut row) = row else {
        return None;
    };
    let row_id = row.get("id").and_then(Value::as_str).map(str::to_string);
    let Some(Value::Object(mut doc)) = row.remove("doc") else {
        return None;
    };

    if !doc.get("shipment_id").is_some_and(is_truthy) {
        return None;
    }

    // The row id is authoritative for identity.
    if let Some(id) = row_id {
        doc.insert("_id".to_string(), Value::String(id));
    }

    match serde_json::from_value::<Shipment>(Value::Object(doc)) {
        Ok(shipment) => Some(shipment),
        Err(err) => {
            debug!(error = %err, "skipping undecodable shipment row");
            None
        }
    }
}

/// Documents are kept when `shipment_id` holds any value other than
/// `null`, `false`, zero or the empty string.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ShipmentStatus;
    use serde_json::json;

    #[test]
    fn rows_without_shipment_id_are_skipped() {
        let body = json!({
            "total_rows": 4,
            "rows": [
                { "id": "1", "doc": { "_id": "1", "_rev": "1-a", "shipment_id": "73", "status": "delayed" } },
                { "id": "_design/views", "doc": { "_id": "_design/views", "views": {} } },
                { "id": "3", "doc": { "_id": "3", "_rev": "1-c", "shipment_id": "" } },
                { "id": "4", "value": { "rev": "1-d" } }
            ]
        });

        let shipments = parse_all_docs(body).unwrap();
        assert_eq!(shipments.len(), 1);
        assert_eq!(shipments[0].id.as_str(), "1");
        assert_eq!(shipments[0].revision.as_ref().unwrap().as_str(), "1-a");
        assert_eq!(shipments[0].status, ShipmentStatus::Delayed);
    }

    #[test]
    fn loosely_typed_fields_are_kept_as_text() {
        let body = json!({
            "rows": [
                { "id": "a", "doc": { "_id": "a", "_rev": "1-a", "shipment_id": "S1", "rfid": null } },
                { "id": "b", "doc": { "_id": "b", "_rev": "1-b", "shipment_id": "S2", "item_id": 733 } },
                { "id": "c", "doc": { "_id": "c", "_rev": "1-c", "shipment_id": 75 } },
                { "id": "d", "doc": { "_id": "d", "_rev": "1-d", "shipment_id": "S4", "timestamp": 1718000000000_i64 } },
                { "id": "e", "doc": { "_id": "e", "_rev": "1-e", "shipment_id": 0 } },
                { "id": "f", "doc": { "_id": "f", "_rev": "1-f", "shipment_id": null } }
            ]
        });

        let shipments = parse_all_docs(body).unwrap();

        assert_eq!(shipments.len(), 4);
        assert_eq!(shipments[0].rfid, "");
        assert_eq!(shipments[1].item_id, "733");
        assert_eq!(shipments[2].shipment_id, "75");
        assert_eq!(shipments[3].timestamp, "1718000000000");
        assert!(shipments.iter().all(|shipment| shipment.revision.is_some()));
    }

    #[test]
    fn row_id_fills_missing_document_id() {
        let body = json!({ "rows": [ { "id": "9", "doc": { "_rev": "2-x", "shipment_id": "875" } } ] });
        let shipments = parse_all_docs(body).unwrap();
        assert_eq!(shipments[0].id.as_str(), "9");
    }

    #[test]
    fn missing_rows_is_malformed() {
        let err = parse_all_docs(json!({ "error": "oops" })).unwrap_err();
        assert!(matches!(err, StoreError::MalformedResponse(_)));

        let err = parse_all_docs(json!([1, 2])).unwrap_err();
        assert!(matches!(err, StoreError::MalformedResponse(_)));
    }

    #[test]
    fn error_body_prefers_reason() {
        let body: ErrorBody =
            serde_json::from_value(json!({ "error": "conflict", "reason": "Document update conflict." }))
                .unwrap();
        assert_eq!(body.describe().as_deref(), Some("Document update conflict."));
        assert_eq!(ErrorBody::default().describe(), None);
    }
}
