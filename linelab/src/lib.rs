//! linelab - spectroscopic line data off the interactive thread
//!
//! This library fetches spectroscopic line data from a remote service,
//! caches line tables and cross-sections, groups lines into bands, and
//! computes derived spectra - all on background worker threads so an
//! interactive caller never blocks.
//!
//! # High-Level API
//!
//! Build the shared pieces once, then dispatch work:
//!
//! ```ignore
//! use linelab::cache::DataCache;
//! use linelab::dispatch::{JobDispatcher, WorkRequest};
//! use linelab::provider::{HitranProvider, ReqwestClient, DEFAULT_HOST};
//! use std::sync::Arc;
//!
//! let cache = Arc::new(DataCache::new("data")?);
//! let client = ReqwestClient::new(90)?;
//! let provider = Arc::new(HitranProvider::new(client, DEFAULT_HOST));
//!
//! let dispatcher = JobDispatcher::new(cache, provider);
//! let handle = dispatcher.dispatch(WorkRequest::TableNames, |result| {
//!     println!("{} finished: {:?}", result.job_id, result.outcome);
//! })?;
//! ```
//!
//! Results are delivered to the continuation in completion order; see the
//! [`dispatch`] module for the cancellation and fetch-serialization rules.

pub mod cache;
pub mod config;
pub mod data;
pub mod dispatch;
pub mod fetch;
pub mod logging;
pub mod provider;
pub mod spectra;

/// Version of the linelab library and CLI.
///
/// Synchronized across the workspace; defined in `Cargo.toml` and injected
/// at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
