//! Fetch validation, error taxonomy, and the per-table metadata record.

use crate::cache::DataCache;
use crate::provider::{LineDataProvider, ProviderError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Everything that can go wrong fetching line data, as a closed enumeration.
///
/// Matches over this enum are exhaustive on purpose: adding or removing a
/// kind forces every consumer to take a position at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The isotopologue selection was empty; caught before any remote call
    BadIsoList,
    /// The line-data service could not be reached
    BadConnection,
    /// The service was reached but the request failed
    FailedToRetrieveData,
    /// The request succeeded but the wavenumber window matched no lines
    EmptyResultSet,
    /// A worker thread for the job could not be started
    FailedToOpenThread,
}

/// A fetch failure: enumerated kind plus a human-readable description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{description}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub description: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}

/// Parameters of a fetch operation.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Name for the fetched table.
    pub data_name: String,
    /// Global isotopologue ids to fetch lines for.
    pub iso_id_list: Vec<u32>,
    /// Lower wavenumber bound.
    pub numin: f64,
    /// Upper wavenumber bound.
    pub numax: f64,
    /// Additional parameter groups to request.
    pub parameter_groups: Vec<String>,
    /// Additional individual parameters to request.
    pub parameters: Vec<String>,
}

/// Side record persisted next to a fetched table.
///
/// Records what was asked for, so a later session can tell how a cached
/// table came to be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchMetadata {
    pub table_name: String,
    pub iso_id_list: Vec<u32>,
    pub numin: f64,
    pub numax: f64,
    pub fetched_at: DateTime<Utc>,
}

impl FetchMetadata {
    fn path(data_dir: &Path, table_name: &str) -> PathBuf {
        data_dir.join(format!("{}.meta", table_name))
    }

    /// Writes the record as JSON under the data directory.
    pub fn save(&self, data_dir: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(Self::path(data_dir, &self.table_name), json)
    }

    /// Reads the record for a table, if one exists.
    pub fn load(data_dir: &Path, table_name: &str) -> std::io::Result<Self> {
        let text = fs::read_to_string(Self::path(data_dir, table_name))?;
        serde_json::from_str(&text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// Maps a structured provider failure onto the fetch taxonomy.
pub(crate) fn classify_provider_error(error: ProviderError) -> FetchError {
    match error {
        ProviderError::Connection(msg) => FetchError::new(
            FetchErrorKind::BadConnection,
            format!(
                "bad connection: failed to reach the line-data service ({})",
                msg
            ),
        ),
        ProviderError::EmptyResult { numin, numax } => FetchError::new(
            FetchErrorKind::EmptyResultSet,
            format!(
                "no line records between {} and {}; try widening the wavenumber range",
                numin, numax
            ),
        ),
        other => FetchError::new(
            FetchErrorKind::FailedToRetrieveData,
            format!("fetch failure: {}", other),
        ),
    }
}

/// Validates and runs a fetch.
///
/// An empty isotopologue list fails with [`FetchErrorKind::BadIsoList`]
/// before any remote call. On success the fetched table is cached (with a
/// durable write), its metadata side record is persisted, and the refreshed
/// list of all known table and cross-section names is returned.
pub fn try_fetch(
    cache: &DataCache,
    provider: &dyn LineDataProvider,
    request: &FetchRequest,
) -> Result<Vec<String>, FetchError> {
    if request.iso_id_list.is_empty() {
        return Err(FetchError::new(
            FetchErrorKind::BadIsoList,
            "fetch failure: select at least one isotopologue",
        ));
    }

    let table = provider
        .fetch_by_ids(
            &request.data_name,
            &request.iso_id_list,
            request.numin,
            request.numax,
            &request.parameter_groups,
            &request.parameters,
        )
        .map_err(classify_provider_error)?;

    let rows = table.rows();
    cache.put_table(table).map_err(|e| {
        FetchError::new(
            FetchErrorKind::FailedToRetrieveData,
            format!("fetched data could not be cached: {}", e),
        )
    })?;

    let metadata = FetchMetadata {
        table_name: request.data_name.clone(),
        iso_id_list: request.iso_id_list.clone(),
        numin: request.numin,
        numax: request.numax,
        fetched_at: Utc::now(),
    };
    if let Err(e) = metadata.save(cache.data_dir()) {
        // The table itself is cached and usable; losing the side record
        // only costs provenance.
        warn!(table = %request.data_name, error = %e, "failed to write fetch metadata");
    }

    info!(table = %request.data_name, rows, "fetch complete");
    Ok(cache.table_names())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Column, Table};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct ScriptedProvider {
        calls: AtomicUsize,
        outcome: Result<(), ProviderError>,
    }

    impl ScriptedProvider {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Ok(()),
            }
        }

        fn failing(error: ProviderError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Err(error),
            }
        }
    }

    impl LineDataProvider for ScriptedProvider {
        fn fetch_by_ids(
            &self,
            name: &str,
            _iso_ids: &[u32],
            _numin: f64,
            _numax: f64,
            _parameter_groups: &[String],
            _parameters: &[String],
        ) -> Result<Table, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()?;
            Ok(Table::new(
                name,
                vec![
                    ("nu".to_string(), Column::Float(vec![667.3, 668.1])),
                    ("sw".to_string(), Column::Float(vec![1.2e-19, 3.4e-20])),
                ],
            )
            .unwrap())
        }

        fn fetch_cross_section(&self, _name: &str) -> Result<Vec<u8>, ProviderError> {
            unimplemented!("not used by these tests")
        }
    }

    fn request() -> FetchRequest {
        FetchRequest {
            data_name: "co2".to_string(),
            iso_id_list: vec![7],
            numin: 600.0,
            numax: 700.0,
            parameter_groups: vec![],
            parameters: vec![],
        }
    }

    #[test]
    fn test_empty_iso_list_skips_remote_call() {
        let dir = TempDir::new().unwrap();
        let cache = DataCache::new(dir.path()).unwrap();
        let provider = ScriptedProvider::ok();

        let mut req = request();
        req.iso_id_list.clear();
        let err = try_fetch(&cache, &provider, &req).unwrap_err();

        assert_eq!(err.kind, FetchErrorKind::BadIsoList);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(cache.table_names().is_empty());
    }

    #[test]
    fn test_connection_failure_classified() {
        let dir = TempDir::new().unwrap();
        let cache = DataCache::new(dir.path()).unwrap();
        let provider =
            ScriptedProvider::failing(ProviderError::Connection("connection refused".into()));

        let err = try_fetch(&cache, &provider, &request()).unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::BadConnection);
        assert!(cache.get_table("co2").is_none());
    }

    #[test]
    fn test_http_failure_classified() {
        let dir = TempDir::new().unwrap();
        let cache = DataCache::new(dir.path()).unwrap();
        let provider = ScriptedProvider::failing(ProviderError::Http("status 500".into()));

        let err = try_fetch(&cache, &provider, &request()).unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::FailedToRetrieveData);
    }

    #[test]
    fn test_empty_range_classified_separately() {
        let dir = TempDir::new().unwrap();
        let cache = DataCache::new(dir.path()).unwrap();
        let provider = ScriptedProvider::failing(ProviderError::EmptyResult {
            numin: 600.0,
            numax: 600.001,
        });

        let err = try_fetch(&cache, &provider, &request()).unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::EmptyResultSet);
    }

    #[test]
    fn test_successful_fetch_caches_and_records_metadata() {
        let dir = TempDir::new().unwrap();
        let cache = DataCache::new(dir.path()).unwrap();
        let provider = ScriptedProvider::ok();

        let names = try_fetch(&cache, &provider, &request()).unwrap();
        assert!(names.contains(&"co2".to_string()));
        assert_eq!(cache.get_table("co2").unwrap().rows(), 2);

        let meta = FetchMetadata::load(dir.path(), "co2").unwrap();
        assert_eq!(meta.iso_id_list, vec![7]);
        assert_eq!(meta.numin, 600.0);
        assert_eq!(meta.numax, 700.0);
    }
}
