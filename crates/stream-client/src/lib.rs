//! Client-side consumer for the relay's event stream.
//!
//! Turns the `data: {json}` SSE body of `POST /v1/chat/stream` back
//! into typed [`sr_domain::stream::StreamingEvent`]s, with cooperative
//! cancellation and last-request-wins semantics: one stream per
//! consumer, starting a new one cancels the old.

mod consumer;
mod frames;

pub use consumer::{StreamConsumer, StreamRequest};
