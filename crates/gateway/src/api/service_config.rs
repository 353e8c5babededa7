//! Client-facing service configuration.
//!
//! - `GET /v1/config` — selectable models and search indexes

use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

/// `GET /v1/config` — returns the model and search-index choices a
/// client UI may offer. Secrets and upstream URLs are never exposed.
pub async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    let relay = &state.config.relay;
    Json(serde_json::json!({
        "success": true,
        "data": {
            "models": &relay.models,
            "searchIndexes": &relay.search_indexes,
            "defaultModel": &state.config.completion.default_model,
            "defaultSearchIndex": &relay.default_search_index,
        }
    }))
}
