pub mod auth;
pub mod chat;
pub mod prompts;
pub mod service_config;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
///
/// Routes are split into **public** (health probe) and **protected**
/// (gated behind the `SR_API_TOKEN` bearer-token middleware).
///
/// `state` is needed to wire up the auth middleware at build time.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/healthz", get(health));

    let protected = Router::new()
        // Chat (core relay)
        .route("/v1/chat", post(chat::chat))
        .route("/v1/chat/stream", post(chat::chat_stream))
        // Prompt templates
        .route("/v1/prompts", get(prompts::list_prompts))
        // Client-facing service configuration
        .route("/v1/config", get(service_config::get_config))
        .layer(middleware::from_fn_with_state(
            state,
            auth::require_api_token,
        ));

    public.merge(protected)
}

async fn health() -> &'static str {
    "ok"
}
