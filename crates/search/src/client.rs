//! REST client for the ranked search index.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use sr_domain::config::SearchConfig;
use sr_domain::error::{Error, Result};
use sr_domain::hit::SearchHit;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Seam
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One ranked lookup against an external index.
///
/// `limit` is advisory upstream; callers over-fetch a pool and truncate
/// locally after re-sorting (see [`crate::rank`]).
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, index: &str, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
pub struct SearchClient {
    http: Client,
    base_url: String,
    token: String,
}

impl SearchClient {
    pub fn new(cfg: &SearchConfig, token: String) -> Result<Self> {
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
}

#[async_trait]
impl SearchBackend for SearchClient {
    async fn search(&self, index: &str, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let body = serde_json::json!({
            "query": query,
            "limit": limit,
            "filter": index,
        });

        tracing::debug!(index, limit, "search request");

        let resp = self
            .http
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Search(format!("transport: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::Search(format!("body read: {e}")))?;

        if !status.is_success() {
            return Err(Error::Search(format!(
                "index '{index}' returned HTTP {}: {text}",
                status.as_u16()
            )));
        }

        let payload: Value =
            serde_json::from_str(&text).map_err(|e| Error::Search(format!("malformed body: {e}")))?;

        Ok(normalize_hits(&payload))
    }
}

/// Normalize the upstream `{hits: [{id, data, metadata, score}]}` shape
/// into [`SearchHit`]s. Hits without an id get a positional one; hits
/// without a score sort last (score 0).
fn normalize_hits(payload: &Value) -> Vec<SearchHit> {
    let hits = match payload.get("hits").and_then(|h| h.as_array()) {
        Some(arr) => arr,
        None => return Vec::new(),
    };

    hits.iter()
        .enumerate()
        .map(|(i, hit)| SearchHit {
            id: hit
                .get("id")
                .and_then(|v| v.as_str())
                .map(String::from)
                .unwrap_or_else(|| format!("result-{i}")),
            content: hit
                .get("data")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default(),
            metadata: hit
                .get("metadata")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default(),
            score: hit.get("score").and_then(|v| v.as_f64()).unwrap_or(0.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_maps_upstream_field_names() {
        let payload = json!({
            "hits": [
                {"id": "a", "data": {"Name": "Widget"}, "metadata": {"k": "v"}, "score": 0.9},
                {"data": {"Name": "Anon"}, "score": 0.5},
            ]
        });
        let hits = normalize_hits(&payload);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[0].content["Name"], "Widget");
        assert_eq!(hits[0].metadata["k"], "v");
        assert_eq!(hits[1].id, "result-1");
        assert!(hits[1].metadata.is_empty());
    }

    #[test]
    fn normalize_tolerates_missing_hits_array() {
        assert!(normalize_hits(&json!({})).is_empty());
        assert!(normalize_hits(&json!({"hits": null})).is_empty());
    }

    #[test]
    fn missing_score_defaults_to_zero() {
        let hits = normalize_hits(&json!({"hits": [{"id": "x", "data": {}}]}));
        assert_eq!(hits[0].score, 0.0);
    }
}
