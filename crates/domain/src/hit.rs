//! The retrieval data model: search hits, their display projection, and
//! the persisted prompt/profile records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An open key/value bag. The upstream index's shape is genuinely
/// caller-defined per index, so no fixed schema is recovered; use the
/// helpers in [`crate::fields`] instead of speculative field access.
pub type FieldMap = Map<String, Value>;

/// One ranked retrieval result. Created per search call, held only for
/// the duration of one request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    /// Domain fields as stored in the index.
    pub content: FieldMap,
    /// Optional side-channel fields (may be empty).
    #[serde(default)]
    pub metadata: FieldMap,
    /// Relevance, higher = more relevant. Only meaningful for ordering
    /// within a single query; never compared across queries.
    pub score: f64,
}

/// A [`SearchHit`] projected for display and citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Absolute URL, or empty when the hit carries no URL candidate.
    pub url: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: FieldMap,
}

/// A named, reusable system-prompt body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// The literal system-prompt text, sent verbatim.
    pub content: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Generation configuration bundled under a [`ChatbotProfile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileConfig {
    pub search_index: String,
    pub model_name: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// A named "assistant persona": generation settings plus a reference to
/// a prompt template. The reference is resolved at generation time, not
/// validated at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub config: ProfileConfig,
    #[serde(default)]
    pub system_prompt_id: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    /// Carried through for the management panels; quota enforcement
    /// uses the server-level limit.
    #[serde(default)]
    pub rate_limit_per_hour: Option<u32>,
}

/// Which profile and prompt a client session currently points at.
///
/// Passed explicitly into the relay instead of being read from ambient
/// storage inside nested calls; the key-value store stays the
/// persistence backend but is only touched at the request boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub active_chatbot_id: Option<String>,
    #[serde(default)]
    pub active_prompt_id: Option<String>,
}
