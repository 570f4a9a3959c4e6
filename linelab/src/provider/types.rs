//! Provider trait and structured error type.

use crate::data::Table;
use thiserror::Error;

/// Failures from the remote line-data service.
///
/// The variants separate reachability from application-level failure so
/// callers classify outcomes by matching, not by scraping message text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// The service could not be reached at all
    #[error("connection failure: {0}")]
    Connection(String),

    /// The service was reached but answered with an error
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered but the body could not be interpreted
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request succeeded but matched no line records
    #[error("no line records in requested range {numin}..{numax}")]
    EmptyResult { numin: f64, numax: f64 },
}

/// The remote "fetch by isotopologue ids" and "fetch cross-section by name"
/// contracts.
///
/// Implementations do not retry; callers may. Both calls are synchronous
/// and are only ever invoked from a dispatcher execution unit, never from
/// the interactive thread.
pub trait LineDataProvider: Send + Sync {
    /// Fetches line records for the given isotopologues and wavenumber
    /// window, parsed into a table named `name`.
    fn fetch_by_ids(
        &self,
        name: &str,
        iso_ids: &[u32],
        numin: f64,
        numax: f64,
        parameter_groups: &[String],
        parameters: &[String],
    ) -> Result<Table, ProviderError>;

    /// Fetches raw cross-section file content by name.
    fn fetch_cross_section(&self, name: &str) -> Result<Vec<u8>, ProviderError>;
}
