//! The spectral computation pipeline.
//!
//! Three stages, each optional beyond the first: a line-shape profile turns
//! cached line records into a coefficient profile, a derivation transform
//! turns coefficients into an absorption / radiance / transmittance
//! spectrum, and an instrumental slit function convolves the result. The
//! pipeline's stable output contract is the [`SpectrumEnvelope`].

mod derive;
mod pipeline;
mod profile;
mod slit;

pub use derive::{absorption, radiance, transmittance};
pub use pipeline::{
    absorption_coefficient, absorption_spectrum, radiance_spectrum, transmittance_spectrum,
    CoefficientRequest, EnvelopeArgs, InstrumentalSettings, PlotLabels, SpectrumEnvelope,
    SpectrumRequest,
};
pub use profile::{LineProfile, ProfileArgs};
pub use slit::{convolve_spectrum, SlitFunction};

use crate::data::DataError;
use thiserror::Error;

/// A molecule / isotopologue id pair a computation should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub molecule_id: u32,
    pub isotopologue_id: u32,
}

/// Thermodynamic environment of a computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    /// Temperature in kelvin.
    pub temperature: f64,
    /// Pressure in atmospheres.
    pub pressure: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            temperature: 296.0,
            pressure: 1.0,
        }
    }
}

/// Diluent mixing ratios for pressure broadening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diluent {
    /// Fraction broadened by air.
    pub air: f64,
    /// Fraction broadened by the absorber itself.
    pub self_broadening: f64,
}

impl Default for Diluent {
    fn default() -> Self {
        Self {
            air: 1.0,
            self_broadening: 0.0,
        }
    }
}

/// Inclusive wavenumber window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavenumberRange {
    pub min: f64,
    pub max: f64,
}

/// Pipeline failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// The requested line-shape function is not in the registry
    #[error("unknown line profile '{0}'")]
    UnknownProfile(String),

    /// The profile contract forbids a diluent for this entry
    #[error("profile '{0}' does not accept a diluent")]
    DiluentNotAccepted(&'static str),

    /// The profile contract requires a diluent for this entry
    #[error("profile '{0}' requires a diluent")]
    DiluentRequired(&'static str),

    /// The request named no source table
    #[error("no source table given")]
    NoSourceTable,

    /// Range and step produce no wavenumber grid
    #[error("range {min}..{max} with step {step} yields no grid points")]
    EmptyGrid { min: f64, max: f64, step: f64 },

    /// A table or column the computation needs is missing or mistyped
    #[error(transparent)]
    Data(#[from] DataError),
}
