use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_DATABASE_RELATIVE_PATH: &str = "unbroken/unbroken.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub storage: StorageConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub list_limit: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub database_url: String,
    pub snapshot_key: String,
    pub queue_key: String,
    pub dead_letter_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    pub sync_interval: u64,
    /// Failed replays allowed before an entry is dead-lettered; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig {
                base_url: "http://127.0.0.1:4984/logistics".to_string(),
                username: None,
                password: None,
                list_limit: 500,
                timeout_secs: 30,
            },
            storage: StorageConfig {
                database_url: default_database_url(),
                snapshot_key: "unbroken_shipments_cache".to_string(),
                queue_key: "unbroken_pending_updates_queue".to_string(),
                dead_letter_key: "unbroken_dead_letter_queue".to_string(),
            },
            sync: SyncConfig {
                auto_sync: true,
                sync_interval: 300, // 5 minutes
                max_attempts: None,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("UNBROKEN_REMOTE_URL").filter(|v| !v.trim().is_empty()) {
            cfg.remote.base_url = v.trim().trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("UNBROKEN_REMOTE_USERNAME") {
            cfg.remote.username = Some(v).filter(|v| !v.trim().is_empty());
        }
        if let Some(v) = lookup("UNBROKEN_REMOTE_PASSWORD") {
            cfg.remote.password = Some(v).filter(|v| !v.is_empty());
        }
        if let Some(value) = lookup("UNBROKEN_REMOTE_LIST_LIMIT").and_then(|v| parse_u32(&v)) {
            cfg.remote.list_limit = value.max(1);
        }
        if let Some(value) = lookup("UNBROKEN_REMOTE_TIMEOUT_SECS").and_then(|v| parse_u64(&v)) {
            cfg.remote.timeout_secs = value.max(1);
        }

        if let Some(v) = lookup("UNBROKEN_DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            cfg.storage.database_url = v.trim().to_string();
        }

        if let Some(v) = lookup("UNBROKEN_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Some(value) = lookup("UNBROKEN_SYNC_INTERVAL_SECS").and_then(|v| parse_u64(&v)) {
            cfg.sync.sync_interval = value.max(1);
        }
        if let Some(value) = lookup("UNBROKEN_SYNC_MAX_ATTEMPTS").and_then(|v| parse_u32(&v)) {
            // 0 keeps the unbounded retry policy
            cfg.sync.max_attempts = if value == 0 { None } else { Some(value) };
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        let url = self.remote.base_url.trim();
        if url.is_empty() {
            return Err("Remote base_url must not be empty".to_string());
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("Remote base_url must be an http(s) URL: {url}"));
        }
        if self.remote.list_limit == 0 {
            return Err("Remote list_limit must be greater than 0".to_string());
        }
        if self.remote.password.is_some() && self.remote.username.is_none() {
            return Err("Remote password is set without a username".to_string());
        }
        if self.storage.database_url.trim().is_empty() {
            return Err("Storage database_url must not be empty".to_string());
        }
        let keys = [
            &self.storage.snapshot_key,
            &self.storage.queue_key,
            &self.storage.dead_letter_key,
        ];
        if keys.iter().any(|key| key.trim().is_empty()) {
            return Err("Storage keys must not be empty".to_string());
        }
        if keys[0] == keys[1] || keys[0] == keys[2] || keys[1] == keys[2] {
            return Err("Storage keys must be distinct".to_string());
        }
        if self.sync.auto_sync && self.sync.sync_interval == 0 {
            return Err("Sync sync_interval must be greater than 0".to_string());
        }
        Ok(())
    }
}

pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|base| base.join(DEFAULT_DATABASE_RELATIVE_PATH))
}

fn default_database_url() -> String {
    match default_database_path() {
        Some(path) => format!("sqlite://{}?mode=rwc", path.display()),
        None => "sqlite://data/unbroken.db?mode=rwc".to_string(),
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
