//! Work requests: one typed parameter record per operation.

use crate::data::Condition;
use crate::fetch::FetchRequest;
use crate::spectra::{CoefficientRequest, SpectrumRequest};

/// Parameters for band grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct BandsRequest {
    pub table_name: String,
}

/// Parameters for deriving a filtered table.
#[derive(Debug, Clone)]
pub struct SelectRequest {
    pub table_name: String,
    pub destination_table_name: String,
    /// Columns to keep; `None` keeps all.
    pub parameter_names: Option<Vec<String>>,
    /// Row predicate; `None` keeps every row.
    pub condition: Option<Condition>,
}

/// Parameters for downloading cross-section files.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadXscRequest {
    /// Cross-section names as known to the remote service.
    pub cross_sections: Vec<String>,
    /// Molecule name used to derive the local file names.
    pub molecule_name: String,
}

/// A dispatchable operation with its parameters.
///
/// The enumeration is closed: resolving an operation is an exhaustive
/// match, so an unhandled operation is a compile error rather than a
/// runtime surprise.
#[derive(Debug, Clone)]
pub enum WorkRequest {
    /// Fetch line data from the remote service into a named table.
    Fetch(FetchRequest),
    /// Derive a filtered table from a cached one.
    Select(SelectRequest),
    /// Group a table's lines into bands.
    Bands(BandsRequest),
    /// Compute a coefficient profile.
    AbsorptionCoefficient(CoefficientRequest),
    /// Compute an absorption spectrum.
    AbsorptionSpectrum(SpectrumRequest),
    /// Compute a radiance spectrum.
    RadianceSpectrum(SpectrumRequest),
    /// Compute a transmittance spectrum.
    TransmittanceSpectrum(SpectrumRequest),
    /// Summarize a cached table or cross-section.
    TableMetaData { table_name: String },
    /// List all cached table and cross-section names.
    TableNames,
    /// Download cross-section files and cache them.
    DownloadCrossSections(DownloadXscRequest),
    /// Load every table and cross-section found in the data directory.
    Start,
}

impl WorkRequest {
    /// Short operation name for logging and worker-thread naming.
    pub fn operation_name(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Select(_) => "select",
            Self::Bands(_) => "bands",
            Self::AbsorptionCoefficient(_) => "absorption-coefficient",
            Self::AbsorptionSpectrum(_) => "absorption-spectrum",
            Self::RadianceSpectrum(_) => "radiance-spectrum",
            Self::TransmittanceSpectrum(_) => "transmittance-spectrum",
            Self::TableMetaData { .. } => "table-meta-data",
            Self::TableNames => "table-names",
            Self::DownloadCrossSections(_) => "download-xsc",
            Self::Start => "start",
        }
    }
}
