//! Prompt template listing.
//!
//! - `GET /v1/prompts` — prompt templates from the config store

use axum::extract::State;
use axum::response::{IntoResponse, Json};

use sr_domain::hit::PromptTemplate;

use crate::state::AppState;

/// `GET /v1/prompts` — returns the stored prompt templates.
///
/// An empty or unreachable config store yields the built-in default
/// prompt so clients always have at least one template to offer.
pub async fn list_prompts(State(state): State<AppState>) -> impl IntoResponse {
    let mut prompts = state.store.prompts().await;
    if prompts.is_empty() {
        prompts.push(PromptTemplate {
            id: "default".to_owned(),
            name: "Default".to_owned(),
            description: Some("Built-in default prompt".to_owned()),
            content: state.config.relay.default_system_prompt.clone(),
            is_default: true,
        });
    }
    Json(serde_json::json!({ "success": true, "data": prompts }))
}
