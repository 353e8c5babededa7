//! Search index client, defensive ranking, and the citation projection.
//!
//! Search failures always propagate as [`sr_domain::error::Error::Search`]:
//! a zero-hit result is a valid outcome the relay special-cases, so it
//! must never be conflated with a transport failure.

pub mod client;
pub mod rank;
pub mod sources;

pub use client::{SearchBackend, SearchClient};
pub use sources::to_sources;
