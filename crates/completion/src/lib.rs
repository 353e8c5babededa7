//! Completion client: prompt/context assembly, model-family request
//! shaping, and single-shot plus token-streaming chat completions
//! against an OpenAI-style endpoint.

pub mod context;
pub mod dispatch;
pub mod openai;
pub mod sse;
pub mod traits;

pub use openai::OpenAiClient;
pub use traits::{Completion, CompletionBackend, CompletionEvent, CompletionRequest};
