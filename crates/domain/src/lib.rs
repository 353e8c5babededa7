//! Shared domain types for the searchrelay workspace.
//!
//! Everything that crosses a crate boundary lives here: the error
//! taxonomy, the streaming event union, the retrieval data model, the
//! open field-map helpers, and the layered TOML configuration.

pub mod config;
pub mod error;
pub mod fields;
pub mod hit;
pub mod stream;
pub mod url;

pub use error::{Error, Result};
