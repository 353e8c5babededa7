use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HTTP server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_bind")]
    pub bind: String,
    /// Env var holding the API bearer token. Unset or empty = dev mode
    /// (no auth enforced, logged once at startup).
    #[serde(default = "d_token_env")]
    pub api_token_env: String,
    /// Requests per key per hour before 429, applied by the in-process
    /// quota tracker to every protected route. Zero disables the quota.
    #[serde(default = "d_rate_limit")]
    pub rate_limit_per_hour: u32,
    /// Allowed CORS origins. Empty = allow any (dev mode).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: d_bind(),
            api_token_env: d_token_env(),
            rate_limit_per_hour: d_rate_limit(),
            cors_origins: Vec::new(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_bind() -> String {
    "127.0.0.1:8787".into()
}
fn d_token_env() -> String {
    "SR_API_TOKEN".into()
}
fn d_rate_limit() -> u32 {
    100
}
