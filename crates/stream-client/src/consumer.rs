use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use sr_domain::error::{Error, Result};
use sr_domain::stream::{BoxStream, StreamingEvent};

use crate::frames::drain_event_payloads;

/// Options for one streamed chat query, mirroring the relay's request
/// body.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// A cancellable consumer of the relay's event stream.
///
/// At most one stream is active per consumer: the in-flight stream's
/// cancellation handle lives in a single slot, and starting a new
/// stream swaps-and-cancels it atomically before the new request is
/// issued. Cancellation is cooperative — the generator observes its own
/// token and returns, it does not error.
pub struct StreamConsumer {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    current: Arc<Mutex<Option<CancellationToken>>>,
}

impl StreamConsumer {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// Cancel the in-flight stream, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.current.lock().take() {
            token.cancel();
        }
    }

    /// Start streaming one query. Any prior in-flight stream is
    /// cancelled first (last-request-wins, not a queue).
    pub fn stream_chat(&self, req: StreamRequest) -> BoxStream<'static, Result<StreamingEvent>> {
        let token = CancellationToken::new();
        // Swap under the lock so a racing second call cannot observe
        // the old handle after we have already cancelled it.
        if let Some(old) = self.current.lock().replace(token.clone()) {
            old.cancel();
        }

        let http = self.http.clone();
        let endpoint = self.endpoint.clone();
        let api_key = self.api_key.clone();

        Box::pin(async_stream::stream! {
            let send = http
                .post(&endpoint)
                .bearer_auth(&api_key)
                .json(&req)
                .send();

            let resp = tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!("stream cancelled before connect");
                    return;
                }
                r = send => r,
            };

            let resp = match resp {
                Ok(r) => r,
                Err(e) => {
                    yield Err(Error::Http(format!("stream connect: {e}")));
                    return;
                }
            };

            if !resp.status().is_success() {
                let status = resp.status().as_u16();
                let text = resp.text().await.unwrap_or_default();
                let message = serde_json::from_str::<serde_json::Value>(&text)
                    .ok()
                    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                    .unwrap_or_else(|| format!("HTTP {status}"));
                yield Err(Error::Http(message));
                return;
            }

            let mut resp = resp;
            let mut buffer = String::new();

            loop {
                let chunk = tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!("stream cancelled mid-flight");
                        return;
                    }
                    c = resp.chunk() => c,
                };

                match chunk {
                    Ok(Some(bytes)) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));
                        for payload in drain_event_payloads(&mut buffer) {
                            match serde_json::from_str::<StreamingEvent>(&payload) {
                                Ok(event) => {
                                    let terminal = event.is_terminal();
                                    yield Ok(event);
                                    if terminal {
                                        return;
                                    }
                                }
                                Err(e) => {
                                    // One bad event does not end the
                                    // sequence.
                                    tracing::warn!(error = %e, "skipping malformed event payload");
                                }
                            }
                        }
                    }
                    Ok(None) => return,
                    Err(e) => {
                        yield Err(Error::Http(format!("stream read: {e}")));
                        return;
                    }
                }
            }
        })
    }
}
