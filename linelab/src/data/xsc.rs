//! Cross-sections: pre-computed absorption spectra keyed by file name.

use thiserror::Error;

/// A cached absorption cross-section.
///
/// Unlike a line table, a cross-section is an already-evaluated spectrum:
/// a wavenumber grid and position-aligned absorption coefficients. The name
/// keeps its `.xsc` extension, which is how cross-sections are told apart
/// from line tables in the shared name space.
///
/// `numin`/`numax` always equal the first and last grid points; the parser
/// builds the grid from them, so the invariant holds by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSection {
    /// Cache key, including the `.xsc` extension.
    pub name: String,
    /// Wavenumber grid (uniform, ascending).
    pub nu: Vec<f64>,
    /// Absorption coefficients, one per grid point.
    pub abscoef: Vec<f64>,
    /// Lower wavenumber bound.
    pub numin: f64,
    /// Upper wavenumber bound.
    pub numax: f64,
    /// Number of grid points.
    pub len: usize,
}

/// Summary of a cached cross-section, for table metadata queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossSectionMeta {
    pub numin: f64,
    pub numax: f64,
    pub length: usize,
}

impl CrossSection {
    /// The metadata summary for this cross-section.
    pub fn meta(&self) -> CrossSectionMeta {
        CrossSectionMeta {
            numin: self.numin,
            numax: self.numax,
            length: self.len,
        }
    }
}

/// Cross-section text that could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid cross-section '{name}': {reason}")]
pub struct XscParseError {
    pub name: String,
    pub reason: String,
}

impl XscParseError {
    fn new(name: &str, reason: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parses cross-section file text.
///
/// The expected layout is a header line
/// `molecule numin numax npts temperature pressure ...` followed by `npts`
/// whitespace-separated absorption coefficients, wrapped across as many
/// lines as needed. The wavenumber grid is reconstructed as `npts` uniform
/// steps from `numin` to `numax`.
pub fn parse_xsc(name: &str, text: &str) -> Result<CrossSection, XscParseError> {
    let mut lines = text.lines();
    let header = lines
        .next()
        .ok_or_else(|| XscParseError::new(name, "file is empty"))?;

    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(XscParseError::new(
            name,
            format!("header has {} fields, expected at least 4", fields.len()),
        ));
    }

    let numin: f64 = fields[1]
        .parse()
        .map_err(|_| XscParseError::new(name, format!("bad numin '{}'", fields[1])))?;
    let numax: f64 = fields[2]
        .parse()
        .map_err(|_| XscParseError::new(name, format!("bad numax '{}'", fields[2])))?;
    let npts: usize = fields[3]
        .parse()
        .map_err(|_| XscParseError::new(name, format!("bad point count '{}'", fields[3])))?;

    if npts < 2 {
        return Err(XscParseError::new(name, "point count must be at least 2"));
    }
    if numax <= numin {
        return Err(XscParseError::new(
            name,
            format!("numax {} is not above numin {}", numax, numin),
        ));
    }

    let mut abscoef = Vec::with_capacity(npts);
    for token in lines.flat_map(str::split_whitespace) {
        let value: f64 = token
            .parse()
            .map_err(|_| XscParseError::new(name, format!("bad coefficient '{}'", token)))?;
        abscoef.push(value);
    }
    if abscoef.len() != npts {
        return Err(XscParseError::new(
            name,
            format!("found {} coefficients, header says {}", abscoef.len(), npts),
        ));
    }

    let step = (numax - numin) / (npts - 1) as f64;
    let nu: Vec<f64> = (0..npts).map(|i| numin + step * i as f64).collect();

    Ok(CrossSection {
        name: name.to_string(),
        nu,
        abscoef,
        numin,
        numax,
        len: npts,
    })
}
