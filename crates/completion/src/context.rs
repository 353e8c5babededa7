//! Prompt context assembly.
//!
//! Every `content` field and every non-empty `metadata` field of every
//! hit goes into the context — there is no server-side truncation and
//! no field allowlist. Overflowing a model's context window surfaces as
//! an upstream error instead of being silently pre-empted here; that is
//! the documented contract, not an oversight.

use sr_domain::fields::display_value;
use sr_domain::hit::SearchHit;
use sr_domain::url::{looks_like_url, resolve_url};

const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

/// Render ranked hits as numbered labeled blocks, most relevant first.
/// Field values that look like URLs are rewritten to absolute URLs
/// against `base_origin` so the model never cites a bare path.
pub fn build_context(hits: &[SearchHit], base_origin: &str) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| render_block(hit, i + 1, base_origin))
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

fn render_block(hit: &SearchHit, number: usize, base_origin: &str) -> String {
    let mut lines = vec![format!("Result {number}:")];

    for (key, value) in &hit.content {
        lines.push(render_field(key, value, base_origin));
    }
    for (key, value) in &hit.metadata {
        let rendered = display_value(value);
        if rendered.is_empty() {
            continue;
        }
        lines.push(render_field(key, value, base_origin));
    }

    lines.join("\n")
}

fn render_field(key: &str, value: &serde_json::Value, base_origin: &str) -> String {
    let rendered = display_value(value);
    if looks_like_url(key, &rendered) {
        format!("{key}: {}", resolve_url(base_origin, &rendered))
    } else {
        format!("{key}: {rendered}")
    }
}

/// The fixed user-turn wrapper around the query and its context.
pub fn user_message(query: &str, context: &str) -> String {
    format!(
        "Question: {query}\n\nRelevant content from the website:\n{context}\n\n\
         Please provide a comprehensive answer based on this information."
    )
}
