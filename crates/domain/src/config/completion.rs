use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Completion service
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "d_completion_url")]
    pub base_url: String,
    /// Env var holding the completion-service API key.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_model")]
    pub default_model: String,
    #[serde(default = "d_120000")]
    pub timeout_ms: u64,
    /// Output budget sent upstream (as `max_tokens` or
    /// `max_completion_tokens` depending on the model family).
    #[serde(default = "d_1000")]
    pub max_output_tokens: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: d_completion_url(),
            api_key_env: d_api_key_env(),
            default_model: d_model(),
            timeout_ms: d_120000(),
            max_output_tokens: d_1000(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_completion_url() -> String {
    "https://api.openai.com/v1".into()
}
fn d_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn d_model() -> String {
    "gpt-4o-mini".into()
}
fn d_120000() -> u64 {
    120_000
}
fn d_1000() -> u32 {
    1000
}
