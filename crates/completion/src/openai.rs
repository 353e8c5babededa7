//! OpenAI-style chat completions adapter.
//!
//! Works with any endpoint that follows the chat completions contract.
//! Owns the one documented silent retry in the system: when a request
//! carrying `temperature` is rejected with an error that mentions
//! temperature, it is re-sent once without the parameter.

use std::time::Duration;

use serde_json::Value;

use sr_domain::config::CompletionConfig;
use sr_domain::error::{Error, Result};
use sr_domain::stream::{BoxStream, TokenUsage};

use crate::context::{build_context, user_message};
use crate::dispatch::apply_shape;
use crate::traits::{Completion, CompletionBackend, CompletionEvent, CompletionRequest};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    /// Origin that relative URLs inside hit fields resolve against.
    base_origin: String,
    max_output_tokens: u32,
}

impl OpenAiClient {
    pub fn new(cfg: &CompletionConfig, api_key: String, base_origin: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key,
            base_origin,
            max_output_tokens: cfg.max_output_tokens,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_body(&self, req: &CompletionRequest, stream: bool) -> Value {
        let context = build_context(&req.hits, &self.base_origin);

        let mut body = serde_json::json!({
            "model": req.model,
            "messages": [
                { "role": "system", "content": req.system_prompt },
                { "role": "user", "content": user_message(&req.query, &context) },
            ],
            "stream": stream,
        });

        apply_shape(&mut body, &req.model, req.temperature, self.max_output_tokens);

        if stream {
            body["stream_options"] = serde_json::json!({"include_usage": true});
        }
        body
    }

    /// POST the body; on a non-success status whose error text mentions
    /// temperature, retry once with the parameter removed. Any other
    /// failure becomes a descriptive [`Error::Completion`].
    async fn post_completion(&self, body: Value) -> Result<reqwest::Response> {
        let resp = self
            .http
            .post(self.chat_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Completion {
                status: None,
                message: format!("transport: {e}"),
            })?;

        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();

        let had_temperature = body.get("temperature").is_some();
        if had_temperature && text.contains("temperature") {
            tracing::warn!(status, "model rejected temperature, retrying without it");
            let mut retry = body;
            if let Some(obj) = retry.as_object_mut() {
                obj.remove("temperature");
            }

            let resp = self
                .http
                .post(self.chat_url())
                .bearer_auth(&self.api_key)
                .json(&retry)
                .send()
                .await
                .map_err(|e| Error::Completion {
                    status: None,
                    message: format!("transport on retry: {e}"),
                })?;

            if resp.status().is_success() {
                return Ok(resp);
            }
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Completion {
                status: Some(status),
                message: text,
            });
        }

        Err(Error::Completion {
            status: Some(status),
            message: text,
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn parse_completion(body: &Value) -> Result<Completion> {
    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| Error::Completion {
            status: None,
            message: "no choices in response".into(),
        })?;

    let text = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let token_count = body
        .get("usage")
        .and_then(|u| u.get("completion_tokens"))
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    Ok(Completion { text, token_count })
}

fn parse_usage(v: &Value) -> Option<TokenUsage> {
    Some(TokenUsage {
        prompt_tokens: v.get("prompt_tokens")?.as_u64()? as u32,
        completion_tokens: v.get("completion_tokens")?.as_u64()? as u32,
        total_tokens: v.get("total_tokens")?.as_u64()? as u32,
    })
}

/// Parse one streaming `data:` payload into events.
///
/// A malformed payload is logged and skipped — it never aborts the
/// stream. The `[DONE]` sentinel itself carries nothing; the terminal
/// event comes from the usage-bearing frame (or the stream fallback).
fn parse_stream_data(data: &str) -> Vec<CompletionEvent> {
    if data.trim() == "[DONE]" {
        return Vec::new();
    }

    let v: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "skipping malformed stream payload");
            return Vec::new();
        }
    };

    let choice = v
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first());

    // Usage-only frame (stream_options.include_usage): the terminal.
    let Some(choice) = choice else {
        if let Some(usage) = v.get("usage").and_then(parse_usage) {
            return vec![CompletionEvent::Done { usage }];
        }
        return Vec::new();
    };

    if let Some(text) = choice
        .get("delta")
        .and_then(|d| d.get("content"))
        .and_then(|v| v.as_str())
    {
        if !text.is_empty() {
            return vec![CompletionEvent::Delta {
                text: text.to_string(),
            }];
        }
    }

    // finish_reason frames carry no text; usage follows separately.
    Vec::new()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl CompletionBackend for OpenAiClient {
    async fn generate(&self, req: &CompletionRequest) -> Result<Completion> {
        tracing::debug!(model = %req.model, hits = req.hits.len(), "completion request");

        let resp = self.post_completion(self.build_body(req, false)).await?;
        let body: Value = resp.json().await.map_err(|e| Error::Completion {
            status: None,
            message: format!("malformed body: {e}"),
        })?;
        parse_completion(&body)
    }

    async fn generate_stream(
        &self,
        req: &CompletionRequest,
    ) -> Result<BoxStream<'static, Result<CompletionEvent>>> {
        tracing::debug!(model = %req.model, hits = req.hits.len(), "streaming completion request");

        let resp = self.post_completion(self.build_body(req, true)).await?;
        Ok(crate::sse::sse_event_stream(resp, parse_stream_data))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
