//! Chat API endpoints — the primary interface for the relay.
//!
//! - `POST /v1/chat`        — non-streaming: returns the full response
//! - `POST /v1/chat/stream` — SSE streaming: sources, deltas, usage

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json};

use sr_domain::Error;

use crate::relay::{run_relay, run_relay_once, RelayRequest};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/chat (non-streaming)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<RelayRequest>,
) -> impl IntoResponse {
    match run_relay_once(&state.relay_deps(), &body).await {
        Ok(outcome) => Json(serde_json::json!({
            "success": true,
            "data": outcome.data,
            "usage": outcome.usage,
        }))
        .into_response(),
        Err(e) => {
            let status = error_status(&e);
            (
                status,
                Json(serde_json::json!({
                    "success": false,
                    "error": e.to_string(),
                    "kind": e.kind(),
                })),
            )
                .into_response()
        }
    }
}

/// Map a relay error to an HTTP status for the JSON endpoint.
fn error_status(e: &Error) -> StatusCode {
    match e {
        Error::Validation(_) | Error::Config(_) => StatusCode::BAD_REQUEST,
        Error::Auth(_) => StatusCode::UNAUTHORIZED,
        Error::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/chat/stream (SSE)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Each event is a `data: {json}` frame whose payload carries a `type`
/// tag (`start`, `content`, `done`, `error`). Relay failures surface as
/// an `error` event inside the stream, never as a broken connection.
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(body): Json<RelayRequest>,
) -> impl IntoResponse {
    use futures_util::StreamExt;

    let events = run_relay(state.relay_deps(), body).map(|ev| {
        let payload = serde_json::to_string(&ev).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to serialize streaming event");
            r#"{"type":"error","message":"internal serialization failure"}"#.to_owned()
        });
        Ok::<_, std::convert::Infallible>(Event::default().data(payload))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
