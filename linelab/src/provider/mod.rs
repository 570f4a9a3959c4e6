//! Remote line-data service collaborators.
//!
//! The dispatcher's execution units talk to the remote service through the
//! [`LineDataProvider`] trait; the HTTP transport underneath is abstracted
//! behind [`HttpClient`] so tests can substitute canned responses. Provider
//! failures are structured: connectivity, HTTP-level, and empty-result
//! outcomes are distinct variants, never inferred from message text.

mod hitran;
mod http;
mod types;

pub use hitran::{parse_line_records, HitranProvider, DEFAULT_HOST};
pub use http::{HttpClient, ReqwestClient};
pub use types::{LineDataProvider, ProviderError};
