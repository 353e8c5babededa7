//! Incremental `data: {json}` line decoding.
//!
//! Network reads do not align with event boundaries: a frame can arrive
//! split across two chunks, or several frames can land in one. The
//! decoder drains only newline-terminated lines and leaves a partial
//! trailing line buffered for the next read.

/// Drain complete `data:` payloads from `buffer` in place.
pub(crate) fn drain_event_payloads(buffer: &mut String) -> Vec<String> {
    let mut payloads = Vec::new();

    while let Some(pos) = buffer.find('\n') {
        let line: String = buffer.drain(..=pos).collect();
        let line = line.trim();
        if let Some(data) = line.strip_prefix("data:") {
            let data = data.trim();
            if !data.is_empty() {
                payloads.push(data.to_string());
            }
        }
    }

    payloads
}
