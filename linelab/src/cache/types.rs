//! Cache error type.

use crate::data::XscParseError;
use thiserror::Error;

/// Cache-related failures.
///
/// These are returned as values to the calling work function, never
/// panicked; partial writes are not rolled back.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O failure while persisting or reading a cache artifact
    #[error("cache I/O error for '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Cross-section bytes were not valid UTF-8 text
    #[error("cross-section content for '{name}' is not valid UTF-8")]
    Utf8 { name: String },

    /// Cross-section text did not parse
    #[error(transparent)]
    Xsc(#[from] XscParseError),

    /// On-disk table artifacts disagree with each other
    #[error("corrupt table files for '{name}': {reason}")]
    Corrupt { name: String, reason: String },
}

impl CacheError {
    pub(crate) fn io(name: &str, source: std::io::Error) -> Self {
        Self::Io {
            name: name.to_string(),
            source,
        }
    }
}
