//! REST key-value store client.
//!
//! `KvClient` talks to a remote key-value service over HTTP
//! (`GET /get/{key}`, `POST /set/{key}`, bearer auth) and layers two
//! policies on top of the raw wire:
//!
//! - reads degrade: any transport or status failure on `get` is logged
//!   and reported as "absent", because callers treat stored settings as
//!   optional; writes propagate, because callers must not proceed past a
//!   failed configuration write
//! - reads are lenient about historical encodings ([`lenient::decode_lenient`]),
//!   while writes always single-encode so the legacy double-encoded
//!   shape cannot spread to new values

pub mod client;
pub mod lenient;

pub use client::{ConfigStore, KvClient};
