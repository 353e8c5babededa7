//! REST implementation of the key-value client and the [`ConfigStore`]
//! seam the gateway consumes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use sr_domain::config::StoreConfig;
use sr_domain::error::{Error, Result};
use sr_domain::hit::{ChatbotProfile, PromptTemplate, SessionState};

use crate::lenient::{decode_lenient, encode_value};

// Well-known keys, shared with the management panels that write them.
const KEY_PROMPTS: &str = "chatbot_prompts";
const KEY_PROFILES: &str = "chatbot_profiles";
const KEY_SESSION: &str = "session_state";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Seam
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Typed access to the persisted relay settings.
///
/// Readers never fail: an unreachable store or an undecodable value
/// behaves like an empty collection, and the relay falls back to its
/// configured defaults. Writers propagate errors.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn prompts(&self) -> Vec<PromptTemplate>;
    async fn profiles(&self) -> Vec<ChatbotProfile>;
    async fn session_state(&self) -> SessionState;
    async fn put_session_state(&self, state: &SessionState) -> Result<()>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// REST key-value client. Created once and reused; the underlying
/// `reqwest::Client` maintains a connection pool.
#[derive(Debug, Clone)]
pub struct KvClient {
    http: Client,
    base_url: String,
    token: String,
}

impl KvClient {
    pub fn new(cfg: &StoreConfig, token: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            token,
        })
    }

    fn url(&self, op: &str, key: &str) -> String {
        format!("{}/{op}/{}", self.base_url, urlencoding::encode(key))
    }

    /// Fetch the raw stored string for `key`.
    ///
    /// Any failure — transport, non-success status, unexpected body —
    /// is logged and collapsed to `None` ("absent"). Callers that need
    /// to distinguish failure from absence do not exist by design.
    pub async fn get_raw(&self, key: &str) -> Option<String> {
        let resp = match self
            .http
            .get(self.url("get", key))
            .bearer_auth(&self.token)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(key, error = %e, "kv get failed");
                return None;
            }
        };

        if !resp.status().is_success() {
            tracing::warn!(key, status = resp.status().as_u16(), "kv get non-success");
            return None;
        }

        // Wire shape is `{"result": <stored string or null>}`.
        let body: Value = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key, error = %e, "kv get body undecodable");
                return None;
            }
        };

        match body.get("result") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }

    /// Fetch and leniently decode the value for `key`.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.get_raw(key).await.map(|raw| decode_lenient(&raw))
    }

    /// Store a value under `key`. Unlike reads, failures propagate:
    /// a caller must not continue past a failed configuration write.
    pub async fn set(&self, key: &str, value: &Value) -> Result<()> {
        let (body, content_type) = encode_value(value);

        let resp = self
            .http
            .post(self.url("set", key))
            .bearer_auth(&self.token)
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Store(format!("set {key}: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Store(format!("set {key} returned {status}: {text}")));
        }
        Ok(())
    }

    /// Decode a stored collection, tolerating absence and bad entries.
    async fn get_list<T: serde::de::DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.get(key).await {
            Some(value) => match serde_json::from_value(value) {
                Ok(list) => list,
                Err(e) => {
                    tracing::warn!(key, error = %e, "stored collection undecodable");
                    Vec::new()
                }
            },
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl ConfigStore for KvClient {
    async fn prompts(&self) -> Vec<PromptTemplate> {
        self.get_list(KEY_PROMPTS).await
    }

    async fn profiles(&self) -> Vec<ChatbotProfile> {
        self.get_list(KEY_PROFILES).await
    }

    async fn session_state(&self) -> SessionState {
        match self.get(KEY_SESSION).await {
            Some(value) => serde_json::from_value(value).unwrap_or_default(),
            None => SessionState::default(),
        }
    }

    async fn put_session_state(&self, state: &SessionState) -> Result<()> {
        self.set(KEY_SESSION, &serde_json::to_value(state)?).await
    }
}
