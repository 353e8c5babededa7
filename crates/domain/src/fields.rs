//! Helpers over the open `content` / `metadata` field maps.

use serde_json::Value;

use crate::hit::FieldMap;

/// First named field that is present and renders to a non-empty string.
pub fn first_non_empty<'a>(map: &'a FieldMap, names: &[&str]) -> Option<String> {
    for name in names {
        if let Some(v) = map.get(*name) {
            let s = display_value(v);
            if !s.is_empty() {
                return Some(s);
            }
        }
    }
    None
}

/// Render a JSON value for display: strings verbatim, scalars via their
/// canonical form, null as empty.
pub fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// First string-valued field longer than `min_len` characters, in the
/// map's own field order.
pub fn first_long_string(map: &FieldMap, min_len: usize) -> Option<String> {
    map.values().find_map(|v| match v {
        Value::String(s) if s.chars().count() > min_len => Some(s.clone()),
        _ => None,
    })
}
