use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Key-value store connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "d_store_url")]
    pub base_url: String,
    /// Env var holding the store bearer token.
    #[serde(default = "d_store_token_env")]
    pub token_env: String,
    #[serde(default = "d_8000")]
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: d_store_url(),
            token_env: d_store_token_env(),
            timeout_ms: d_8000(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_store_url() -> String {
    "http://localhost:8079".into()
}
fn d_store_token_env() -> String {
    "SR_STORE_TOKEN".into()
}
fn d_8000() -> u64 {
    8000
}
