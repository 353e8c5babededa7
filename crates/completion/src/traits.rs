use sr_domain::error::Result;
use sr_domain::hit::SearchHit;
use sr_domain::stream::{BoxStream, TokenUsage};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One generation request: a user query plus the ranked hits that form
/// its context. Hits are supplied most-relevant-first; the context
/// builder numbers them in that order.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub query: String,
    /// The selected prompt template's content, sent verbatim as the
    /// system turn — no extra instructions are concatenated.
    pub system_prompt: String,
    pub hits: Vec<SearchHit>,
    pub model: String,
    /// Explicit sampling temperature. `None` lets the model-family rule
    /// decide (legacy families default it, newer families omit it).
    pub temperature: Option<f32>,
}

/// A completed single-shot generation.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    /// Completion tokens as reported upstream (0 when unreported).
    pub token_count: u32,
}

/// Increments of a streaming generation: text deltas in order, then one
/// usage-bearing terminal.
#[derive(Debug, Clone)]
pub enum CompletionEvent {
    Delta { text: String },
    Done { usage: TokenUsage },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Seam
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The relay's generation seam. The production implementation is
/// [`crate::OpenAiClient`]; orchestrator tests substitute stubs.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generate the full answer in one call.
    async fn generate(&self, req: &CompletionRequest) -> Result<Completion>;

    /// Generate incrementally. The stream yields zero or more `Delta`
    /// events followed by exactly one `Done`.
    async fn generate_stream(
        &self,
        req: &CompletionRequest,
    ) -> Result<BoxStream<'static, Result<CompletionEvent>>>;
}
