use super::wire::{ErrorBody, WriteResponse, parse_all_docs};
use crate::application::ports::RemoteShipmentStore;
use crate::domain::entities::Shipment;
use crate::domain::value_objects::{DocumentId, Revision, ShipmentChanges};
use crate::shared::config::RemoteConfig;
use crate::shared::error::{AppError, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, Response, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// HTTP client for a CouchDB-compatible document database (Sync Gateway, CouchDB).
#[derive(Clone)]
pub struct CouchShipmentStore {
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
    list_limit: u32,
    http: reqwest::Client,
}

impl CouchShipmentStore {
    pub fn new(config: &RemoteConfig) -> Result<Self, AppError> {
        let trimmed = config.base_url.trim();
        if trimmed.is_empty() {
            return Err(AppError::Configuration(
                "remote base_url is empty".to_string(),
            ));
        }
        let base_url = Url::parse(trimmed).map_err(|err| {
            AppError::Configuration(format!("invalid remote base_url {trimmed}: {err}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Configuration(format!(
                "remote base_url {trimmed} cannot hold a path"
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            base_url,
            username: config.username.clone().filter(|value| !value.trim().is_empty()),
            password: config.password.clone(),
            list_limit: config.list_limit.max(1),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Appends one path segment to the database URL, percent-encoding it.
    fn url(&self, segment: &str) -> Url {
        let mut url = self.base_url.clone();
        // Bases that cannot hold a path are rejected in `new`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(segment);
        }
        url
    }

    fn request(&self, method: Method, segment: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, self.url(segment));
        match &self.username {
            Some(username) => builder.basic_auth(username, self.password.as_deref()),
            None => builder,
        }
    }
}

#[async_trait]
impl RemoteShipmentStore for CouchShipmentStore {
    async fn list_all(&self) -> Result<Vec<Shipment>, StoreError> {
        let limit = self.list_limit.to_string();
        let resp = self
            .request(Method::GET, "_all_docs")
            .query(&[("include_docs", "true"), ("limit", limit.as_str())])
            .send()
            .await?;
        let resp = ensure_success(resp).await?;

        let body = resp.text().await?;
        let parsed: Value = serde_json::from_str(&body)
            .map_err(|err| StoreError::MalformedResponse(format!("invalid JSON: {err}")))?;
        let shipments = parse_all_docs(parsed)?;

        debug!(count = shipments.len(), "listed shipments");
        Ok(shipments)
    }

    async fn update(
        &self,
        shipment: &Shipment,
        changes: &ShipmentChanges,
    ) -> Result<Shipment, StoreError> {
        let (current, expected) = shipment
            .versioned()
            .ok_or(StoreError::MissingRevision)?
            .into_parts();
        let merged = current.merged_with(changes, Utc::now());

        let resp = self
            .request(Method::PUT, merged.id.as_str())
            .json(&merged)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;

        let body = resp.text().await?;
        let written: WriteResponse = serde_json::from_str(&body).map_err(|err| {
            StoreError::MalformedResponse(format!("invalid write response: {err}"))
        })?;

        let id = DocumentId::new(written.id).map_err(StoreError::MalformedResponse)?;
        let rev = Revision::new(written.rev).map_err(StoreError::MalformedResponse)?;

        info!(
            document_id = %id,
            from_rev = %expected,
            to_rev = %rev,
            "shipment written"
        );

        Ok(Shipment {
            id,
            revision: Some(rev),
            ..merged
        })
    }
}

async fn ensure_success(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

fn api_error(status: StatusCode, body: &str) -> StoreError {
    let reason = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.describe())
        .unwrap_or_else(|| format!("API call failed with status {}", status.as_u16()));
    StoreError::Api {
        status: status.as_u16(),
        reason,
    }
}
