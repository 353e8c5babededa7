/// Shared error type used across all searchrelay crates.
///
/// The variants are the relay's failure taxonomy: callers branch on the
/// variant (via [`Error::kind`]) when deciding how to surface a failure,
/// never on message text.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// Missing credentials or settings, caught before any upstream call.
    #[error("config: {0}")]
    Config(String),

    /// A malformed request (empty query, unresolvable prompt/profile).
    #[error("validation: {0}")]
    Validation(String),

    /// Key-value store failure on a write path (reads degrade to `None`).
    #[error("store: {0}")]
    Store(String),

    /// Search index transport or status failure. Never swallowed: a
    /// zero-result search is a valid outcome and must stay
    /// distinguishable from a failed one.
    #[error("search: {0}")]
    Search(String),

    /// Completion service failure, including malformed response bodies.
    #[error("completion{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Completion { status: Option<u16>, message: String },

    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Stable machine-readable kind for API consumers.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Http(_) => "http",
            Error::Timeout(_) => "timeout",
            Error::Config(_) => "config",
            Error::Validation(_) => "validation",
            Error::Store(_) => "store",
            Error::Search(_) => "upstream_search",
            Error::Completion { .. } => "upstream_completion",
            Error::RateLimited(_) => "rate_limited",
            Error::Auth(_) => "auth",
            Error::Other(_) => "other",
        }
    }

    /// Whether the condition is worth retrying from the caller's side.
    /// Configuration and validation failures are permanent until the
    /// caller changes something; upstream failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::Timeout(_)
                | Error::Search(_)
                | Error::Completion { .. }
                | Error::Store(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
