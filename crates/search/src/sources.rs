//! Citation projection: map raw hits into user-facing source records.
//!
//! Pure and deterministic — no I/O, no clock. The relay calls this once
//! per request, after ranking and truncation, so source numbering here
//! matches the numbering in the generation context.

use sr_domain::fields::{display_value, first_long_string, first_non_empty};
use sr_domain::hit::{SearchHit, SourceRecord};
use sr_domain::url::resolve_url;

const TITLE_FIELDS: &[&str] = &["Name", "Title", "Product"];
const DESCRIPTION_MAX_CHARS: usize = 150;
const DESCRIPTION_MIN_FIELD_CHARS: usize = 20;
const NO_DESCRIPTION: &str = "No description available";

/// Project ranked hits into display records, in order.
pub fn to_sources(hits: &[SearchHit], base_origin: &str) -> Vec<SourceRecord> {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| SourceRecord {
            id: hit.id.clone(),
            title: title_for(hit, i + 1),
            description: description_for(hit),
            url: url_for(hit, base_origin),
            score: hit.score,
            metadata: hit.metadata.clone(),
        })
        .collect()
}

fn title_for(hit: &SearchHit, position: usize) -> String {
    first_non_empty(&hit.content, TITLE_FIELDS).unwrap_or_else(|| format!("Source {position}"))
}

fn description_for(hit: &SearchHit) -> String {
    let raw = first_non_empty(&hit.content, &["Description"])
        .or_else(|| first_long_string(&hit.content, DESCRIPTION_MIN_FIELD_CHARS))
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());
    truncate_with_ellipsis(&raw, DESCRIPTION_MAX_CHARS)
}

fn url_for(hit: &SearchHit, base_origin: &str) -> String {
    let candidate = hit
        .metadata
        .get("Product URL")
        .map(display_value)
        .filter(|s| !s.is_empty())
        .or_else(|| first_non_empty(&hit.content, &["URL", "url"]));

    match candidate {
        Some(raw) => resolve_url(base_origin, &raw),
        None => String::new(),
    }
}

/// Truncate to `max` characters, appending `...` only when something
/// was actually cut.
fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sr_domain::hit::FieldMap;

    const BASE: &str = "https://shop.example.com";

    fn hit(content: serde_json::Value, metadata: serde_json::Value, score: f64) -> SearchHit {
        SearchHit {
            id: "h".into(),
            content: content.as_object().cloned().unwrap_or_else(FieldMap::new),
            metadata: metadata.as_object().cloned().unwrap_or_else(FieldMap::new),
            score,
        }
    }

    #[test]
    fn projection_is_pure() {
        let hits = vec![hit(json!({"Name": "A", "Description": "d"}), json!({}), 0.5)];
        assert_eq!(to_sources(&hits, BASE), to_sources(&hits, BASE));
    }

    #[test]
    fn title_fallback_chain() {
        let h = hit(json!({"Title": "From Title"}), json!({}), 0.1);
        assert_eq!(to_sources(&[h], BASE)[0].title, "From Title");

        let h = hit(json!({"Product": "From Product"}), json!({}), 0.1);
        assert_eq!(to_sources(&[h], BASE)[0].title, "From Product");

        let h = hit(json!({"other": "x"}), json!({}), 0.1);
        let sources = to_sources(&[hit(json!({}), json!({}), 0.1), h], BASE);
        assert_eq!(sources[0].title, "Source 1");
        assert_eq!(sources[1].title, "Source 2");
    }

    #[test]
    fn description_prefers_description_field() {
        let h = hit(
            json!({"Description": "short desc", "Body": "a much longer field that would otherwise win"}),
            json!({}),
            0.1,
        );
        assert_eq!(to_sources(&[h], BASE)[0].description, "short desc");
    }

    #[test]
    fn description_falls_back_to_first_long_field() {
        let h = hit(
            json!({"Name": "tiny", "Body": "this field is comfortably longer than twenty characters"}),
            json!({}),
            0.1,
        );
        assert!(to_sources(&[h], BASE)[0].description.starts_with("this field"));
    }

    #[test]
    fn description_placeholder_when_nothing_qualifies() {
        let h = hit(json!({"Name": "tiny"}), json!({}), 0.1);
        assert_eq!(to_sources(&[h], BASE)[0].description, NO_DESCRIPTION);
    }

    #[test]
    fn long_description_truncated_to_153() {
        let long = "x".repeat(400);
        let h = hit(json!({"Description": long}), json!({}), 0.1);
        let d = &to_sources(&[h], BASE)[0].description;
        assert_eq!(d.chars().count(), 153);
        assert!(d.ends_with("..."));
    }

    #[test]
    fn short_description_is_unchanged() {
        let exact = "y".repeat(150);
        let h = hit(json!({"Description": exact.clone()}), json!({}), 0.1);
        assert_eq!(to_sources(&[h], BASE)[0].description, exact);
    }

    #[test]
    fn url_prefers_product_url_metadata() {
        let h = hit(
            json!({"URL": "/from-content"}),
            json!({"Product URL": "/from-metadata"}),
            0.1,
        );
        assert_eq!(
            to_sources(&[h], BASE)[0].url,
            "https://shop.example.com/from-metadata"
        );
    }

    #[test]
    fn url_from_content_resolved_and_absolute_passthrough() {
        let h = hit(json!({"url": "/p/1"}), json!({}), 0.1);
        assert_eq!(to_sources(&[h], BASE)[0].url, "https://shop.example.com/p/1");

        let h = hit(json!({"URL": "https://elsewhere.example/x"}), json!({}), 0.1);
        assert_eq!(to_sources(&[h], BASE)[0].url, "https://elsewhere.example/x");
    }

    #[test]
    fn missing_url_yields_empty_string() {
        let h = hit(json!({"Name": "n"}), json!({}), 0.1);
        assert_eq!(to_sources(&[h], BASE)[0].url, "");
    }
}
