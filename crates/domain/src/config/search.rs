use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Search index connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "d_search_url")]
    pub base_url: String,
    /// Env var holding the search-service bearer token.
    #[serde(default = "d_search_token_env")]
    pub token_env: String,
    #[serde(default = "d_15000")]
    pub timeout_ms: u64,
    /// Pool size requested upstream. Deliberately larger than any
    /// display cap: upstream relevance ranking is advisory, so we fetch
    /// generously, re-sort locally, and truncate ourselves.
    #[serde(default = "d_pool")]
    pub pool_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: d_search_url(),
            token_env: d_search_token_env(),
            timeout_ms: d_15000(),
            pool_limit: d_pool(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_search_url() -> String {
    "http://localhost:8080".into()
}
fn d_search_token_env() -> String {
    "SR_SEARCH_TOKEN".into()
}
fn d_15000() -> u64 {
    15_000
}
fn d_pool() -> usize {
    100
}
