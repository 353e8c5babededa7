//! Tolerant decoding of historically inconsistent value encodings.
//!
//! Three shapes exist in the store: raw strings, values JSON-encoded
//! once, and values JSON-encoded twice (a bug in a retired write path).
//! This is compatibility code for reads only — the write path always
//! single-encodes.

use serde_json::Value;

/// Decode a stored value, tolerating single and double JSON encoding.
///
/// A value that does not look JSON-like (no leading `{`, `[`, or `"`)
/// is returned as the literal string, as is anything that fails to
/// parse.
pub fn decode_lenient(raw: &str) -> Value {
    if !looks_like_json(raw) {
        return Value::String(raw.to_string());
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(inner)) if looks_like_json(&inner) => {
            // Legacy double-encoded value: one more pass recovers it.
            serde_json::from_str(&inner).unwrap_or(Value::String(inner))
        }
        Ok(v) => v,
        Err(_) => Value::String(raw.to_string()),
    }
}

fn looks_like_json(s: &str) -> bool {
    matches!(s.trim_start().as_bytes().first(), Some(b'{') | Some(b'[') | Some(b'"'))
}

/// Encode a value for `set`.
///
/// Strings go on the wire verbatim as plain text; everything else is
/// JSON-encoded exactly once. Returns the body plus its content type.
pub fn encode_value(value: &Value) -> (String, &'static str) {
    match value {
        Value::String(s) => (s.clone(), "text/plain"),
        other => (other.to_string(), "application/json"),
    }
}
