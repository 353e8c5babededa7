//! Incremental decoding of the upstream SSE completion stream.
//!
//! The wire is chunked `data: {json}` lines delimited by blank lines and
//! terminated by a `[DONE]` sentinel. Chunk boundaries do not align with
//! event boundaries, so raw bytes are buffered and only complete frames
//! are drained; a trailing partial frame waits for the next read.

use sr_domain::error::{Error, Result};
use sr_domain::stream::{BoxStream, TokenUsage};

use crate::traits::CompletionEvent;

/// Extract complete `data:` payloads from the SSE buffer.
///
/// Frames are delimited by `\n\n`; only `data:` lines matter (`event:`,
/// `id:`, `retry:` lines are protocol noise). The buffer is drained in
/// place — consumed bytes are removed, any partial trailing frame stays
/// for the next call.
pub(crate) fn drain_data_lines(buffer: &mut String) -> Vec<String> {
    let mut payloads = Vec::new();

    while let Some(pos) = buffer.find("\n\n") {
        let frame: String = buffer.drain(..pos).collect();
        buffer.drain(..2);

        for line in frame.lines() {
            if let Some(data) = line.trim().strip_prefix("data:") {
                let data = data.trim();
                if !data.is_empty() {
                    payloads.push(data.to_string());
                }
            }
        }
    }

    payloads
}

/// Build a completion-event stream from an SSE response and a payload
/// parser.
///
/// The parser maps one `data:` payload to zero or more events; a
/// payload it cannot make sense of must be logged and skipped there,
/// never turned into a stream abort. The stream flushes the remaining
/// buffer when the body closes and guarantees a trailing `Done` even if
/// the upstream never sent its usage frame.
pub(crate) fn sse_event_stream<F>(
    response: reqwest::Response,
    mut parse_data: F,
) -> BoxStream<'static, Result<CompletionEvent>>
where
    F: FnMut(&str) -> Vec<CompletionEvent> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut response = response;
        let mut buffer = String::new();
        let mut done_emitted = false;

        loop {
            match response.chunk().await {
                Ok(Some(bytes)) => {
                    buffer.push_str(&String::from_utf8_lossy(&bytes));
                    for data in drain_data_lines(&mut buffer) {
                        for event in parse_data(&data) {
                            if matches!(event, CompletionEvent::Done { .. }) {
                                if done_emitted {
                                    continue;
                                }
                                done_emitted = true;
                            }
                            yield Ok(event);
                        }
                    }
                }
                Ok(None) => {
                    // Body closed — flush a possible final frame that
                    // arrived without its trailing blank line.
                    if !buffer.trim().is_empty() {
                        buffer.push_str("\n\n");
                        for data in drain_data_lines(&mut buffer) {
                            for event in parse_data(&data) {
                                if matches!(event, CompletionEvent::Done { .. }) {
                                    if done_emitted {
                                        continue;
                                    }
                                    done_emitted = true;
                                }
                                yield Ok(event);
                            }
                        }
                    }
                    break;
                }
                Err(e) => {
                    yield Err(Error::Completion {
                        status: None,
                        message: format!("stream transport: {e}"),
                    });
                    break;
                }
            }
        }

        if !done_emitted {
            yield Ok(CompletionEvent::Done {
                usage: TokenUsage::default(),
            });
        }
    };

    Box::pin(stream)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
