//! Work results: job identity plus a typed outcome.

use crate::cache::CacheError;
use crate::data::{Bands, DataError, TableHeader};
use crate::fetch::FetchError;
use crate::spectra::{PipelineError, SpectrumEnvelope};
use std::fmt;
use thiserror::Error;

/// Process-wide unique job identity.
///
/// Identities are monotonically increasing integers and are never reused
/// for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub(crate) u64);

impl JobId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Summary of a cached table or cross-section.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMetaData {
    /// Row count (lines or grid points).
    pub length: usize,
    /// Present for line tables only.
    pub header: Option<TableHeader>,
    /// Column names; empty for cross-sections.
    pub parameters: Vec<String>,
    pub numin: f64,
    pub numax: f64,
    /// Whether the entry is a cross-section.
    pub xsc: bool,
}

/// Operation-specific success payloads.
#[derive(Debug, Clone)]
pub enum WorkPayload {
    /// All known table and cross-section names (fetch, table-names).
    TableNames(Vec<String>),
    /// Outcome of a select.
    Select {
        new_table_name: String,
        all_tables: Vec<String>,
    },
    /// Bands of a table.
    Bands(Bands),
    /// A computed spectrum or coefficient profile.
    Spectrum(SpectrumEnvelope),
    /// Table or cross-section summary.
    TableMetaData(TableMetaData),
    /// Local file names of the cross-sections that were cached.
    CrossSectionsAdded(Vec<String>),
    /// Names loaded by a warm start.
    Started(Vec<String>),
}

/// Typed failure of an execution unit.
///
/// Everything an execution unit can fail with reaches the caller as data
/// through exactly one of these variants.
#[derive(Debug, Error)]
pub enum WorkError {
    /// Fetch validation or remote-call failure
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Spectral pipeline or table-shape failure
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Cache persistence failure
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A fetch job was submitted while another is still in flight
    #[error("a fetch job is already in flight; wait for it to complete")]
    FetchInFlight,
}

impl From<DataError> for WorkError {
    fn from(error: DataError) -> Self {
        Self::Pipeline(PipelineError::Data(error))
    }
}

/// A delivered job outcome.
///
/// Carries exactly one of a success payload or a typed error, tagged with
/// the identity of the job that produced it.
#[derive(Debug)]
pub struct WorkResult {
    pub job_id: JobId,
    pub outcome: Result<WorkPayload, WorkError>,
}
