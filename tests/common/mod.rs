#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use unbroken_lib::application::ports::KeyValueStore;
use unbroken_lib::application::services::{PendingUpdateQueue, ShipmentCache, SyncService};
use unbroken_lib::infrastructure::remote::CouchShipmentStore;
use unbroken_lib::shared::config::RemoteConfig;

pub const DB_PATH: &str = "/logistics";
pub const USERNAME: &str = "driver01";
pub const PASSWORD: &str = "pass123";

#[derive(Default)]
struct FakeState {
    docs: Mutex<BTreeMap<String, Value>>,
    unavailable: AtomicBool,
    reject_writes: AtomicBool,
    malformed_listing: AtomicBool,
    list_requests: AtomicUsize,
    put_requests: AtomicUsize,
    last_query: Mutex<Option<String>>,
    last_authorization: Mutex<Option<String>>,
}

/// In-process document store speaking the `_all_docs` / `PUT <id>` dialect
/// with revision checks.
pub struct FakeCouch {
    pub base_url: String,
    state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

impl FakeCouch {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake store");
        let addr = listener.local_addr().expect("fake store addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve fake store");
        });

        Self {
            base_url: format!("http://{addr}{DB_PATH}"),
            state,
            handle,
        }
    }

    pub fn seed(&self, doc: Value) {
        let id = doc["_id"].as_str().expect("seeded doc has _id").to_string();
        self.state.docs.lock().unwrap().insert(id, doc);
    }

    pub fn doc(&self, id: &str) -> Option<Value> {
        self.state.docs.lock().unwrap().get(id).cloned()
    }

    /// Every request answers 503 while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Listing keeps working but every write answers 500.
    pub fn set_reject_writes(&self, reject: bool) {
        self.state.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub fn set_malformed_listing(&self, malformed: bool) {
        self.state.malformed_listing.store(malformed, Ordering::SeqCst);
    }

    pub fn list_requests(&self) -> usize {
        self.state.list_requests.load(Ordering::SeqCst)
    }

    pub fn put_requests(&self) -> usize {
        self.state.put_requests.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<String> {
        self.state.last_query.lock().unwrap().clone()
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }

    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            base_url: self.base_url.clone(),
            username: Some(USERNAME.to_string()),
            password: Some(PASSWORD.to_string()),
            list_limit: 500,
            timeout_secs: 5,
        }
    }

    pub fn client(&self) -> CouchShipmentStore {
        CouchShipmentStore::new(&self.remote_config()).expect("build client")
    }
}

impl Drop for FakeCouch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn shipment_doc(id: &str, rev: &str, shipment_id: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "_rev": rev,
        "shipment_id": shipment_id,
        "origin": "Akron",
        "destination": "Mirzec",
        "handoff_point": "warehouse",
        "item_id": shipment_id,
        "package_condition": "intact",
        "rfid": "0T90T1UO7Z",
        "status": status,
        "handler_role": "dock_worker",
        "timestamp": "2025-01-12T08:00:00.000Z"
    })
}

pub fn sync_service(
    remote: &FakeCouch,
    store: Arc<dyn KeyValueStore>,
    max_attempts: Option<u32>,
) -> SyncService {
    SyncService::new(
        Arc::new(remote.client()),
        ShipmentCache::new(store.clone(), "unbroken_shipments_cache"),
        PendingUpdateQueue::new(
            store,
            "unbroken_pending_updates_queue",
            "unbroken_dead_letter_queue",
        )
        .with_max_attempts(max_attempts),
    )
}

async fn handle(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    *state.last_authorization.lock().unwrap() = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    if state.unavailable.load(Ordering::SeqCst) {
        return error(StatusCode::SERVICE_UNAVAILABLE, "unavailable", "Service unavailable");
    }

    let Some(doc_path) = uri
        .path()
        .strip_prefix(DB_PATH)
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return error(StatusCode::NOT_FOUND, "not_found", "Database does not exist.");
    };

    match (method, doc_path) {
        (Method::GET, "_all_docs") => {
            state.list_requests.fetch_add(1, Ordering::SeqCst);
            *state.last_query.lock().unwrap() = uri.query().map(str::to_string);
            list_docs(&state)
        }
        (Method::PUT, id) if !id.is_empty() => {
            state.put_requests.fetch_add(1, Ordering::SeqCst);
            put_doc(&state, id, &body)
        }
        _ => error(StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed", "Unsupported"),
    }
}

fn list_docs(state: &FakeState) -> Response {
    if state.malformed_listing.load(Ordering::SeqCst) {
        return Json(json!({ "total_rows": 0 })).into_response();
    }

    let docs = state.docs.lock().unwrap();
    let rows: Vec<Value> = docs
        .iter()
        .map(|(id, doc)| {
            json!({
                "id": id,
                "key": id,
                "value": { "rev": doc["_rev"] },
                "doc": doc
            })
        })
        .collect();
    Json(json!({ "total_rows": rows.len(), "offset": 0, "rows": rows })).into_response()
}

fn put_doc(state: &FakeState, id: &str, body: &[u8]) -> Response {
    if state.reject_writes.load(Ordering::SeqCst) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "write rejected");
    }

    let Ok(mut doc) = serde_json::from_slice::<Value>(body) else {
        return error(StatusCode::BAD_REQUEST, "bad_request", "invalid UTF-8 JSON");
    };

    let mut docs = state.docs.lock().unwrap();
    let sent_rev = doc.get("_rev").and_then(Value::as_str).map(str::to_string);
    let stored_rev = docs
        .get(id)
        .and_then(|stored| stored.get("_rev"))
        .and_then(Value::as_str)
        .map(str::to_string);

    if sent_rev != stored_rev {
        return error(StatusCode::CONFLICT, "conflict", "Document update conflict.");
    }

    let generation = stored_rev
        .as_deref()
        .and_then(|rev| rev.split('-').next())
        .and_then(|n| n.parse::<u64>().ok())
        .unwrap_or(0);
    let new_rev = format!("{}-{:08x}", generation + 1, body.len());

    doc["_id"] = json!(id);
    doc["_rev"] = json!(new_rev);
    docs.insert(id.to_string(), doc);

    (
        StatusCode::CREATED,
        Json(json!({ "ok": true, "id": id, "rev": new_rev })),
    )
        .into_response()
}

fn error(status: StatusCode, error: &str, reason: &str) -> Response {
    (status, Json(json!({ "error": error, "reason": reason }))).into_response()
}
