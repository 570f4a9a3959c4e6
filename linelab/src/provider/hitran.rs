//! HITRAN line-by-line service provider.
//!
//! Speaks the public line-by-line API: a GET with the isotopologue id list
//! and wavenumber window, answered with fixed-width 160-column line
//! records, plus a supplementary endpoint for cross-section files.

use super::http::HttpClient;
use super::types::{LineDataProvider, ProviderError};
use crate::data::{Column, Table};
use tracing::{debug, info};

/// Default service host.
pub const DEFAULT_HOST: &str = "https://hitran.org";

/// Byte spans of the fixed-width line record, `(name, start, end, text)`.
///
/// Numeric fields are parsed into float columns, quantum-state fields are
/// kept verbatim as text (leading/trailing spaces included; the band
/// indexer trims for display only).
const RECORD_FIELDS: &[(&str, usize, usize, bool)] = &[
    ("molec_id", 0, 2, false),
    ("local_iso_id", 2, 3, false),
    ("nu", 3, 15, false),
    ("sw", 15, 25, false),
    ("a", 25, 35, false),
    ("gamma_air", 35, 40, false),
    ("gamma_self", 40, 45, false),
    ("elower", 45, 55, false),
    ("n_air", 55, 59, false),
    ("delta_air", 59, 67, false),
    ("global_upper_quanta", 67, 82, true),
    ("global_lower_quanta", 82, 97, true),
    ("local_upper_quanta", 97, 112, true),
    ("local_lower_quanta", 112, 127, true),
];

/// Shortest record that still carries every field above.
const MIN_RECORD_LEN: usize = 127;

/// Provider implementation over the HITRAN HTTP API.
pub struct HitranProvider<C: HttpClient> {
    client: C,
    host: String,
}

impl<C: HttpClient> HitranProvider<C> {
    pub fn new(client: C, host: impl Into<String>) -> Self {
        Self {
            client,
            host: host.into(),
        }
    }

    fn lbl_url(
        &self,
        iso_ids: &[u32],
        numin: f64,
        numax: f64,
        parameter_groups: &[String],
        parameters: &[String],
    ) -> String {
        let ids: Vec<String> = iso_ids.iter().map(u32::to_string).collect();
        let mut url = format!(
            "{}/lbl/api?iso_ids_list={}&numin={}&numax={}",
            self.host,
            ids.join(","),
            numin,
            numax
        );
        if !parameter_groups.is_empty() {
            url.push_str("&parameter_groups=");
            url.push_str(&parameter_groups.join(","));
        }
        if !parameters.is_empty() {
            url.push_str("&request_params=");
            url.push_str(&parameters.join(","));
        }
        url
    }
}

impl<C: HttpClient> LineDataProvider for HitranProvider<C> {
    fn fetch_by_ids(
        &self,
        name: &str,
        iso_ids: &[u32],
        numin: f64,
        numax: f64,
        parameter_groups: &[String],
        parameters: &[String],
    ) -> Result<Table, ProviderError> {
        let url = self.lbl_url(iso_ids, numin, numax, parameter_groups, parameters);
        info!(table = name, numin, numax, isotopologues = iso_ids.len(), "fetching line data");

        let body = self.client.get(&url)?;
        let text = String::from_utf8(body)
            .map_err(|_| ProviderError::InvalidResponse("body is not UTF-8 text".into()))?;

        let table = parse_line_records(name, &text)?;
        if table.rows() == 0 {
            return Err(ProviderError::EmptyResult { numin, numax });
        }
        debug!(table = name, rows = table.rows(), "line data parsed");
        Ok(table)
    }

    fn fetch_cross_section(&self, name: &str) -> Result<Vec<u8>, ProviderError> {
        let url = format!("{}/suppl/xsec/{}", self.host, name);
        info!(xsc = name, "fetching cross-section");
        self.client.get(&url)
    }
}

/// Parses fixed-width line records into a table named `name`.
///
/// Blank lines are skipped; anything else shorter than the record layout is
/// an invalid response. An empty body parses to an empty table; the caller
/// decides whether that is an error.
pub fn parse_line_records(name: &str, text: &str) -> Result<Table, ProviderError> {
    let mut floats: Vec<Vec<f64>> = vec![Vec::new(); RECORD_FIELDS.len()];
    let mut texts: Vec<Vec<String>> = vec![Vec::new(); RECORD_FIELDS.len()];

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if line.len() < MIN_RECORD_LEN {
            return Err(ProviderError::InvalidResponse(format!(
                "record {} is {} characters, expected at least {}",
                line_no + 1,
                line.len(),
                MIN_RECORD_LEN
            )));
        }
        for (idx, &(field, start, end, is_text)) in RECORD_FIELDS.iter().enumerate() {
            let raw = line.get(start..end).ok_or_else(|| {
                ProviderError::InvalidResponse(format!(
                    "record {} splits a multi-byte character in field '{}'",
                    line_no + 1,
                    field
                ))
            })?;
            if is_text {
                texts[idx].push(raw.to_string());
            } else {
                let value: f64 = raw.trim().parse().map_err(|_| {
                    ProviderError::InvalidResponse(format!(
                        "record {}: bad value '{}' in field '{}'",
                        line_no + 1,
                        raw.trim(),
                        field
                    ))
                })?;
                floats[idx].push(value);
            }
        }
    }

    let columns = RECORD_FIELDS
        .iter()
        .enumerate()
        .map(|(idx, &(field, _, _, is_text))| {
            let column = if is_text {
                Column::Text(std::mem::take(&mut texts[idx]))
            } else {
                Column::Float(std::mem::take(&mut floats[idx]))
            };
            (field.to_string(), column)
        })
        .collect();

    Table::new(name, columns)
        .map_err(|e| ProviderError::InvalidResponse(format!("inconsistent records: {}", e)))
}
