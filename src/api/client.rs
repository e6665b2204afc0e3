//! HTTP-backed remote store speaking a JSON command protocol.
//!
//! Every call is one POST to the configured command endpoint with a single
//! command object. Entries travel as `{h, name, t, s, cts, mts}`; file
//! content is base64url-encoded on the wire. Errors come back as negative
//! integers. There is no retry logic here - callers see every failure.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::base64::{base64url_decode, base64url_encode};
use crate::config::Credentials;
use crate::error::{DriveError, Result};
use crate::fs::NodeKind;

use super::store::{ListFilter, RemoteEntry, RemoteStore, SortOrder, UpdatePatch};

/// Store error codes returned as negative integers on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// Internal error
    Internal = -1,
    /// Invalid arguments
    Args = -2,
    /// Access denied
    AccessDenied = -7,
    /// Resource already exists
    Exist = -8,
    /// Resource does not exist
    NotExist = -9,
    /// Session expired
    Expired = -13,
    /// Unknown error
    Unknown = -9999,
}

impl From<i64> for StoreErrorCode {
    fn from(code: i64) -> Self {
        match code {
            -1 => StoreErrorCode::Internal,
            -2 => StoreErrorCode::Args,
            -7 => StoreErrorCode::AccessDenied,
            -8 => StoreErrorCode::Exist,
            -9 => StoreErrorCode::NotExist,
            -13 => StoreErrorCode::Expired,
            _ => StoreErrorCode::Unknown,
        }
    }
}

impl StoreErrorCode {
    /// Get a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            StoreErrorCode::Internal => "Internal error",
            StoreErrorCode::Args => "Invalid arguments",
            StoreErrorCode::AccessDenied => "Access denied",
            StoreErrorCode::Exist => "Resource already exists",
            StoreErrorCode::NotExist => "Resource does not exist",
            StoreErrorCode::Expired => "Session expired",
            StoreErrorCode::Unknown => "Unknown error",
        }
    }
}

/// Wire representation of one entry.
#[derive(Debug, Deserialize)]
struct WireEntry {
    h: String,
    name: String,
    t: i64,
    #[serde(default)]
    s: u64,
    #[serde(default)]
    cts: Option<i64>,
    #[serde(default)]
    mts: Option<i64>,
}

impl WireEntry {
    fn into_entry(self) -> Result<RemoteEntry> {
        let kind = NodeKind::from_i64(self.t).ok_or(DriveError::InvalidResponse)?;
        Ok(RemoteEntry {
            id: self.h,
            name: self.name,
            kind,
            size: self.s,
            created_at: self.cts,
            modified_at: self.mts,
        })
    }
}

/// HTTP remote store client.
#[derive(Debug)]
pub struct HttpStore {
    http: Client,
    endpoint: String,
    token: String,
    request_id: std::sync::atomic::AtomicU32,
}

impl HttpStore {
    /// Create a client from transport credentials.
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            http: Client::new(),
            endpoint: credentials.endpoint.trim_end_matches('/').to_string(),
            token: credentials.token.clone(),
            request_id: std::sync::atomic::AtomicU32::new(rand::random()),
        }
    }

    /// Send one command object and return the parsed JSON response.
    async fn command(&self, command: Value) -> Result<Value> {
        let action = command.get("a").and_then(|v| v.as_str()).unwrap_or("");
        let id = self
            .request_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let url = format!("{}?id={}", self.endpoint, id);
        let body = serde_json::to_string(&command)?;

        debug!(action, %url, "store command");
        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.token)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(DriveError::InvalidCredentials);
            }
            return Err(DriveError::Http(status.as_u16()));
        }

        let response: Value = serde_json::from_str(&response.text().await?)?;

        // Scalar negative numbers are error codes.
        if let Some(code) = response.as_i64() {
            if code < 0 {
                let store_code = StoreErrorCode::from(code);
                return Err(DriveError::Api {
                    code: code as i32,
                    message: store_code.description().to_string(),
                });
            }
        }

        Ok(response)
    }

    fn parse_entry(value: Value) -> Result<RemoteEntry> {
        let wire: WireEntry = serde_json::from_value(value)?;
        wire.into_entry()
    }

    fn filter_json(filter: &ListFilter) -> Value {
        let mut f = serde_json::Map::new();
        if let Some(name) = &filter.name_exact {
            f.insert("name".into(), json!(name));
        }
        if let Some(sub) = &filter.name_contains {
            f.insert("contains".into(), json!(sub));
        }
        if let Some(kind) = filter.kind {
            f.insert("t".into(), json!(kind as u8));
        }
        if let Some(min) = filter.min_size {
            f.insert("smin".into(), json!(min));
        }
        if let Some(max) = filter.max_size {
            f.insert("smax".into(), json!(max));
        }
        if let Some(after) = filter.modified_after {
            f.insert("mtsmin".into(), json!(after));
        }
        if let Some(before) = filter.modified_before {
            f.insert("mtsmax".into(), json!(before));
        }
        f.insert(
            "order".into(),
            json!(match filter.order {
                SortOrder::ModifiedDesc => "mts_desc",
                SortOrder::ModifiedAsc => "mts_asc",
                SortOrder::NameAsc => "name_asc",
            }),
        );
        if let Some(limit) = filter.limit {
            f.insert("limit".into(), json!(limit));
        }
        Value::Object(f)
    }
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn get(&self, id: &str) -> Result<RemoteEntry> {
        let response = self.command(json!({"a": "g", "n": id})).await?;
        Self::parse_entry(response)
    }

    async fn list(&self, parent_id: &str, filter: Option<&ListFilter>) -> Result<Vec<RemoteEntry>> {
        let mut command = json!({"a": "l", "p": parent_id});
        if let Some(filter) = filter {
            command["f"] = Self::filter_json(filter);
        }
        let response = self.command(command).await?;

        let entries = response
            .get("entries")
            .and_then(|v| v.as_array())
            .ok_or(DriveError::InvalidResponse)?;
        entries
            .iter()
            .map(|e| Self::parse_entry(e.clone()))
            .collect()
    }

    async fn create(
        &self,
        parent_id: &str,
        name: &str,
        kind: NodeKind,
        content: Option<Vec<u8>>,
    ) -> Result<RemoteEntry> {
        let mut command = json!({
            "a": "c",
            "p": parent_id,
            "name": name,
            "t": kind as u8,
        });
        if let Some(content) = content {
            command["data"] = json!(base64url_encode(&content));
        }
        let response = self.command(command).await?;
        Self::parse_entry(response)
    }

    async fn update(&self, id: &str, patch: &UpdatePatch) -> Result<RemoteEntry> {
        let mut command = json!({"a": "u", "n": id});
        if let Some(name) = &patch.name {
            command["name"] = json!(name);
        }
        if let Some(content) = &patch.content {
            command["data"] = json!(base64url_encode(content));
        }
        if let Some(parent) = &patch.add_parent {
            command["ap"] = json!(parent);
        }
        if let Some(parent) = &patch.remove_parent {
            command["rp"] = json!(parent);
        }
        let response = self.command(command).await?;
        Self::parse_entry(response)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.command(json!({"a": "d", "n": id})).await?;
        Ok(())
    }

    async fn copy(&self, id: &str, dest_parent_id: &str, new_name: &str) -> Result<RemoteEntry> {
        let response = self
            .command(json!({
                "a": "cp",
                "n": id,
                "p": dest_parent_id,
                "name": new_name,
            }))
            .await?;
        Self::parse_entry(response)
    }

    async fn download(&self, id: &str) -> Result<String> {
        let response = self.command(json!({"a": "r", "n": id})).await?;
        let data = response
            .get("data")
            .and_then(|v| v.as_str())
            .ok_or(DriveError::InvalidResponse)?;
        let bytes = base64url_decode(data)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
