use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Relay behavior
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Index searched when neither the request nor the active profile
    /// names one.
    #[serde(default = "d_index")]
    pub default_search_index: String,
    /// Display cap applied after the local re-sort.
    #[serde(default = "d_max_results")]
    pub max_results: usize,
    /// Origin that relative URLs in hit fields are resolved against.
    #[serde(default = "d_base_origin")]
    pub base_origin: String,
    /// System prompt used when no template is resolvable.
    #[serde(default = "d_system_prompt")]
    pub default_system_prompt: String,
    /// Model names advertised by `GET /v1/config`.
    #[serde(default = "d_models")]
    pub models: Vec<String>,
    /// Search index names advertised by `GET /v1/config`.
    #[serde(default)]
    pub search_indexes: Vec<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            default_search_index: d_index(),
            max_results: d_max_results(),
            base_origin: d_base_origin(),
            default_system_prompt: d_system_prompt(),
            models: d_models(),
            search_indexes: Vec::new(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_index() -> String {
    "products".into()
}
fn d_max_results() -> usize {
    10
}
fn d_base_origin() -> String {
    "https://shop.example.com".into()
}
fn d_system_prompt() -> String {
    "You are a helpful assistant. Use provided sources when available.".into()
}
fn d_models() -> Vec<String> {
    vec![
        "gpt-4o-mini".into(),
        "gpt-4o".into(),
        "gpt-4".into(),
        "gpt-3.5-turbo".into(),
    ]
}
