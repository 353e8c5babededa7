//! searchrelay gateway — HTTP surface and relay orchestration.
//!
//! The gateway wires the config store, search index, and completion
//! service into a single streaming endpoint, plus a handful of JSON
//! endpoints for non-streaming chat and configuration lookup.

pub mod api;
pub mod cli;
pub mod quota;
pub mod relay;
pub mod state;
