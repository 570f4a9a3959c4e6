//! Pipeline orchestration and the result envelope.

use super::profile::LineProfile;
use super::{derive, slit, Component, Diluent, Environment, PipelineError, WavenumberRange};
use crate::cache::DataCache;
use tracing::debug;

/// Display labels echoed through the pipeline untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotLabels {
    pub title: String,
    pub titlex: String,
    pub titley: String,
    /// Name of the resulting graph/selection.
    pub name: String,
}

/// Parameters of the coefficient stage.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientRequest {
    /// Registry name of the line-shape function ("Voigt", "Galatry", …).
    pub profile: String,
    /// Molecule/isotopologue pairs to include; empty means all.
    pub components: Vec<Component>,
    /// Source table names; the first entry is the one used.
    pub source_tables: Vec<String>,
    pub environment: Environment,
    pub diluent: Diluent,
    pub range: WavenumberRange,
    pub step: f64,
    pub wing: f64,
    pub wing_hw: f64,
    pub labels: PlotLabels,
}

/// Instrumental-function settings for the convolution stage.
///
/// An empty function name disables the stage.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentalSettings {
    pub function: String,
    pub resolution: f64,
    pub af_wing: f64,
}

impl Default for InstrumentalSettings {
    fn default() -> Self {
        Self {
            function: String::new(),
            resolution: 0.01,
            af_wing: 100.0,
        }
    }
}

/// Parameters of a derived-spectrum request.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumRequest {
    pub coefficient: CoefficientRequest,
    /// Optical path length in cm.
    pub path_length: f64,
    pub instrumental: InstrumentalSettings,
}

/// Resolved parameters echoed back with every envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeArgs {
    /// Whether the result came straight from a cached cross-section.
    pub xsc: bool,
    pub profile: String,
    pub range: WavenumberRange,
    pub environment: Environment,
    pub diluent: Diluent,
}

/// The pipeline's stable output contract, whatever spectrum kind was
/// requested.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumEnvelope {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub title: String,
    pub titlex: String,
    pub titley: String,
    pub name: String,
    pub args: EnvelopeArgs,
}

impl SpectrumEnvelope {
    fn assemble(request: &CoefficientRequest, xsc: bool, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            x,
            y,
            title: request.labels.title.clone(),
            titlex: request.labels.titlex.clone(),
            titley: request.labels.titley.clone(),
            name: request.labels.name.clone(),
            args: EnvelopeArgs {
                xsc,
                profile: request.profile.clone(),
                range: request.range,
                environment: request.environment,
                diluent: request.diluent,
            },
        }
    }
}

/// Coefficient stage, including the cross-section bypass.
///
/// If the sole source table is cached as a cross-section rather than a line
/// table, its stored `nu`/`abscoef` pairs are returned verbatim and the
/// envelope is tagged `xsc: true`; no profile computation happens.
pub fn absorption_coefficient(
    cache: &DataCache,
    request: &CoefficientRequest,
) -> Result<SpectrumEnvelope, PipelineError> {
    let source = request
        .source_tables
        .first()
        .ok_or(PipelineError::NoSourceTable)?;

    if let Some(xsc) = cache.get_cross_section(source) {
        debug!(source = %source, "cross-section bypass");
        return Ok(SpectrumEnvelope::assemble(
            request,
            true,
            xsc.nu.clone(),
            xsc.abscoef.clone(),
        ));
    }

    let table = cache
        .get_table(source)
        .ok_or_else(|| PipelineError::Data(crate::data::DataError::TableNotFound(source.clone())))?;

    let profile = LineProfile::from_name(&request.profile)
        .ok_or_else(|| PipelineError::UnknownProfile(request.profile.clone()))?;

    let args = profile.shape_args(
        request.components.clone(),
        request.environment,
        request.range,
        request.step,
        request.wing,
        request.wing_hw,
        request.diluent,
    );
    let (x, y) = profile.compute(&table, &args)?;
    Ok(SpectrumEnvelope::assemble(request, false, x, y))
}

/// Absorption spectrum: coefficients → `1 − exp(−k·l)` → optional slit.
pub fn absorption_spectrum(
    cache: &DataCache,
    request: &SpectrumRequest,
) -> Result<SpectrumEnvelope, PipelineError> {
    let mut envelope = absorption_coefficient(cache, &request.coefficient)?;
    let coef = std::mem::take(&mut envelope.y);
    let (x, y) = derive::absorption(std::mem::take(&mut envelope.x), &coef, request.path_length);
    finish(envelope, request, x, y)
}

/// Transmittance spectrum: coefficients → `exp(−k·l)` → optional slit.
pub fn transmittance_spectrum(
    cache: &DataCache,
    request: &SpectrumRequest,
) -> Result<SpectrumEnvelope, PipelineError> {
    let mut envelope = absorption_coefficient(cache, &request.coefficient)?;
    let coef = std::mem::take(&mut envelope.y);
    let (x, y) = derive::transmittance(std::mem::take(&mut envelope.x), &coef, request.path_length);
    finish(envelope, request, x, y)
}

/// Radiance spectrum: coefficients → Planck-weighted emission → optional
/// slit. The emitting temperature is the request environment's.
pub fn radiance_spectrum(
    cache: &DataCache,
    request: &SpectrumRequest,
) -> Result<SpectrumEnvelope, PipelineError> {
    let mut envelope = absorption_coefficient(cache, &request.coefficient)?;
    let coef = std::mem::take(&mut envelope.y);
    let (x, y) = derive::radiance(
        std::mem::take(&mut envelope.x),
        &coef,
        request.path_length,
        request.coefficient.environment.temperature,
    );
    finish(envelope, request, x, y)
}

fn finish(
    mut envelope: SpectrumEnvelope,
    request: &SpectrumRequest,
    x: Vec<f64>,
    y: Vec<f64>,
) -> Result<SpectrumEnvelope, PipelineError> {
    let (x, y) = slit::convolve_spectrum(
        x,
        y,
        &request.instrumental.function,
        request.instrumental.resolution,
        request.instrumental.af_wing,
    );
    envelope.x = x;
    envelope.y = y;
    Ok(envelope)
}
