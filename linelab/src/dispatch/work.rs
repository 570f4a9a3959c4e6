//! Resolution of operations to component calls.
//!
//! This is the body of every execution unit: one synchronous function that
//! matches the request to the right component and converts any failure into
//! a typed [`WorkError`]. It never panics on bad input and never touches
//! the interactive thread.

use super::request::WorkRequest;
use super::result::{TableMetaData, WorkError, WorkPayload};
use crate::cache::DataCache;
use crate::data::{self, band_index, DataError, SelectOptions};
use crate::fetch::{self, classify_provider_error};
use crate::provider::LineDataProvider;
use crate::spectra;
use tracing::info;

/// Runs one operation to completion.
pub(crate) fn run(
    cache: &DataCache,
    provider: &dyn LineDataProvider,
    request: WorkRequest,
) -> Result<WorkPayload, WorkError> {
    match request {
        WorkRequest::Fetch(req) => {
            let names = fetch::try_fetch(cache, provider, &req)?;
            Ok(WorkPayload::TableNames(names))
        }

        WorkRequest::Select(req) => {
            let table = cache
                .get_table(&req.table_name)
                .ok_or_else(|| DataError::TableNotFound(req.table_name.clone()))?;
            let options = SelectOptions {
                parameter_names: req.parameter_names,
                condition: req.condition,
            };
            let derived = data::select(&table, &req.destination_table_name, &options)?;
            let new_table_name = derived.name.clone();
            let rows = derived.rows();
            cache.put_table(derived)?;
            info!(source = %req.table_name, destination = %new_table_name, rows, "select complete");
            Ok(WorkPayload::Select {
                new_table_name,
                all_tables: cache.table_names(),
            })
        }

        WorkRequest::Bands(req) => {
            let table = cache
                .get_table(&req.table_name)
                .ok_or_else(|| DataError::TableNotFound(req.table_name.clone()))?;
            Ok(WorkPayload::Bands(band_index(&table)?))
        }

        WorkRequest::AbsorptionCoefficient(req) => Ok(WorkPayload::Spectrum(
            spectra::absorption_coefficient(cache, &req)?,
        )),

        WorkRequest::AbsorptionSpectrum(req) => Ok(WorkPayload::Spectrum(
            spectra::absorption_spectrum(cache, &req)?,
        )),

        WorkRequest::RadianceSpectrum(req) => Ok(WorkPayload::Spectrum(
            spectra::radiance_spectrum(cache, &req)?,
        )),

        WorkRequest::TransmittanceSpectrum(req) => Ok(WorkPayload::Spectrum(
            spectra::transmittance_spectrum(cache, &req)?,
        )),

        WorkRequest::TableMetaData { table_name } => table_meta_data(cache, &table_name),

        WorkRequest::TableNames => Ok(WorkPayload::TableNames(cache.table_names())),

        WorkRequest::DownloadCrossSections(req) => {
            let mut added = Vec::with_capacity(req.cross_sections.len());
            for xsc_name in &req.cross_sections {
                let filename = local_xsc_name(xsc_name, &req.molecule_name);
                let bytes = provider
                    .fetch_cross_section(xsc_name)
                    .map_err(classify_provider_error)?;
                cache.add_cross_section(&filename, Some(&bytes))?;
                added.push(filename);
            }
            Ok(WorkPayload::CrossSectionsAdded(added))
        }

        WorkRequest::Start => Ok(WorkPayload::Started(cache.warm_start()?)),
    }
}

/// Summarizes a cached entry, whichever store it lives in.
fn table_meta_data(cache: &DataCache, table_name: &str) -> Result<WorkPayload, WorkError> {
    if let Some(meta) = cache.cross_section_meta(table_name) {
        return Ok(WorkPayload::TableMetaData(TableMetaData {
            length: meta.length,
            header: None,
            parameters: Vec::new(),
            numin: meta.numin,
            numax: meta.numax,
            xsc: true,
        }));
    }

    let table = cache
        .get_table(table_name)
        .ok_or_else(|| DataError::TableNotFound(table_name.to_string()))?;
    let (numin, numax) = table.nu_bounds().ok_or_else(|| DataError::MissingColumn {
        table: table_name.to_string(),
        column: "nu".to_string(),
    })?;
    Ok(WorkPayload::TableMetaData(TableMetaData {
        length: table.rows(),
        header: Some(table.header.clone()),
        parameters: table.parameters().to_vec(),
        numin,
        numax,
        xsc: false,
    }))
}

/// Derives the local file name for a downloaded cross-section.
///
/// A molecule name with underscore-separated qualifiers replaces the first
/// segment of itself and is re-joined without separators; a plain molecule
/// name keeps the remote name as-is.
fn local_xsc_name(xsc_name: &str, molecule_name: &str) -> String {
    let parts: Vec<&str> = molecule_name.split('_').collect();
    if parts.len() <= 1 {
        xsc_name.to_string()
    } else {
        let mut out = String::from(molecule_name);
        for part in &parts[1..] {
            out.push_str(part);
        }
        out
    }
}
