//! Model-family request shaping.
//!
//! Different model families disagree about the output-budget parameter
//! name and about whether `temperature` may be sent at all. The rules
//! live in one ordered table keyed on model-name prefix; adding a new
//! family is one table entry, never a new call-site conditional.

use serde_json::Value;

/// How a family expects the request body to be shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// Newer families: `max_completion_tokens`, temperature only when
    /// the caller explicitly asked for one (some reject it outright —
    /// see the retry in [`crate::openai`]).
    MaxCompletionTokens,
    /// Legacy families: `max_tokens`, temperature always sent
    /// (defaulting to 0.7).
    MaxTokensWithTemperature,
}

struct FamilyRule {
    prefixes: &'static [&'static str],
    shape: RequestShape,
}

/// Evaluated in order; first matching prefix wins.
const FAMILY_TABLE: &[FamilyRule] = &[FamilyRule {
    prefixes: &["gpt-5", "o3", "o4", "gpt-4.1"],
    shape: RequestShape::MaxCompletionTokens,
}];

const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Resolve the request shape for a model name.
pub fn request_shape(model: &str) -> RequestShape {
    for rule in FAMILY_TABLE {
        if rule.prefixes.iter().any(|p| model.starts_with(p)) {
            return rule.shape;
        }
    }
    RequestShape::MaxTokensWithTemperature
}

/// Apply the family's parameter rules to a request body.
pub fn apply_shape(body: &mut Value, model: &str, temperature: Option<f32>, max_output_tokens: u32) {
    match request_shape(model) {
        RequestShape::MaxCompletionTokens => {
            body["max_completion_tokens"] = max_output_tokens.into();
            if let Some(t) = temperature {
                body["temperature"] = serde_json::json!(f64::from(t));
            }
        }
        RequestShape::MaxTokensWithTemperature => {
            body["max_tokens"] = max_output_tokens.into();
            let t = temperature.map(f64::from).unwrap_or(DEFAULT_TEMPERATURE);
            body["temperature"] = serde_json::json!(t);
        }
    }
}
