use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::hit::SourceRecord;

/// A boxed async stream, used for streaming completion and relay output.
pub type BoxStream<'a, T> = Pin<Box<dyn futures_core::Stream<Item = T> + Send + 'a>>;

/// One increment of the relay's output, as sent on the wire.
///
/// A well-formed sequence is `start`, then zero or more `content`, then
/// exactly one of `done` / `error`. Nothing follows a terminal event —
/// enforced by [`EventSequencer`], not by caller discipline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamingEvent {
    /// Emitted exactly once, first. Citations are known before
    /// generation begins, so the UI can render them immediately.
    Start { sources: Vec<SourceRecord> },

    /// An incremental answer fragment, in generation order.
    Content { text: String },

    /// Terminal on success.
    Done { usage: RelayUsage },

    /// Terminal on failure, mutually exclusive with `done`.
    Error { message: String },
}

impl StreamingEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamingEvent::Done { .. } | StreamingEvent::Error { .. })
    }
}

/// Usage summary carried by the terminal `done` event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayUsage {
    pub search_results_count: usize,
    pub response_tokens: u32,
    pub search_latency_ms: u64,
}

/// Token usage as reported by the completion service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Event sequencing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Gatekeeper for the relay's event ordering invariant.
///
/// Each method returns the event to emit, or `None` when emitting it
/// would violate the sequence (duplicate `start`, anything after a
/// terminal). Violations are logged and suppressed rather than sent.
#[derive(Debug, Default)]
pub struct EventSequencer {
    started: bool,
    terminal: bool,
}

impl EventSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, sources: Vec<SourceRecord>) -> Option<StreamingEvent> {
        if self.terminal || self.started {
            tracing::warn!("suppressing out-of-order start event");
            return None;
        }
        self.started = true;
        Some(StreamingEvent::Start { sources })
    }

    pub fn content(&mut self, text: String) -> Option<StreamingEvent> {
        if self.terminal {
            tracing::warn!("suppressing content event after terminal");
            return None;
        }
        Some(StreamingEvent::Content { text })
    }

    pub fn done(&mut self, usage: RelayUsage) -> Option<StreamingEvent> {
        if self.terminal {
            tracing::warn!("suppressing duplicate terminal event");
            return None;
        }
        self.terminal = true;
        Some(StreamingEvent::Done { usage })
    }

    pub fn error(&mut self, message: impl Into<String>) -> Option<StreamingEvent> {
        if self.terminal {
            tracing::warn!("suppressing error event after terminal");
            return None;
        }
        self.terminal = true;
        Some(StreamingEvent::Error {
            message: message.into(),
        })
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}
