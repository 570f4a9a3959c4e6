//! Line-shape function registry and the coefficient stage.

use super::{Component, Diluent, Environment, PipelineError, WavenumberRange};
use crate::data::Table;
use tracing::debug;

/// Reference temperature for pressure-broadening scaling, in kelvin.
const T_REF: f64 = 296.0;

/// Doppler half-width per unit wavenumber at the reference temperature.
const DOPPLER_WIDTH_COEFF: f64 = 5.9e-6;

/// Fallback half-widths when a table lacks broadening columns, in cm⁻¹/atm.
const DEFAULT_GAMMA_AIR: f64 = 0.05;
const DEFAULT_GAMMA_SELF: f64 = 0.1;

const LN2: f64 = std::f64::consts::LN_2;

/// The fixed registry of line-shape functions.
///
/// Each entry is selected by its display name and computes a coefficient
/// profile through the same signature: a source table plus [`ProfileArgs`].
/// The Galatry entry is backed by a Doppler-type kernel and is the one
/// registry member whose contract excludes the diluent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineProfile {
    Voigt,
    Lorentz,
    Gauss,
    SdVoigt,
    Galatry,
    Ht,
}

/// Argument record every profile call receives.
///
/// `diluent` is `None` exactly when the selected profile's contract
/// excludes it; [`LineProfile::shape_args`] is the only constructor used by
/// the pipeline, so the contract holds by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileArgs {
    pub components: Vec<Component>,
    pub environment: Environment,
    pub range: WavenumberRange,
    pub step: f64,
    pub wing: f64,
    pub wing_hw: f64,
    pub diluent: Option<Diluent>,
}

impl LineProfile {
    pub const ALL: [LineProfile; 6] = [
        LineProfile::Voigt,
        LineProfile::Lorentz,
        LineProfile::Gauss,
        LineProfile::SdVoigt,
        LineProfile::Galatry,
        LineProfile::Ht,
    ];

    /// Resolves a registry entry from its display name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Voigt" => Some(Self::Voigt),
            "Lorentz" => Some(Self::Lorentz),
            "Gauss" => Some(Self::Gauss),
            "SD Voigt" => Some(Self::SdVoigt),
            "Galatry" => Some(Self::Galatry),
            "HT" => Some(Self::Ht),
            _ => None,
        }
    }

    /// The display name, as it appears in requests.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Voigt => "Voigt",
            Self::Lorentz => "Lorentz",
            Self::Gauss => "Gauss",
            Self::SdVoigt => "SD Voigt",
            Self::Galatry => "Galatry",
            Self::Ht => "HT",
        }
    }

    /// Whether this profile's contract includes the diluent parameter.
    pub fn uses_diluent(&self) -> bool {
        !matches!(self, Self::Galatry)
    }

    /// Shapes the argument record for this profile.
    ///
    /// This is where the per-profile parameter contract is enforced: the
    /// Doppler-backed Galatry entry never sees the diluent, every other
    /// entry always does.
    pub fn shape_args(
        &self,
        components: Vec<Component>,
        environment: Environment,
        range: WavenumberRange,
        step: f64,
        wing: f64,
        wing_hw: f64,
        diluent: Diluent,
    ) -> ProfileArgs {
        ProfileArgs {
            components,
            environment,
            range,
            step,
            wing,
            wing_hw,
            diluent: self.uses_diluent().then_some(diluent),
        }
    }

    /// Computes the coefficient profile for `table` under `args`.
    ///
    /// Returns the `(x, y)` coordinate sequences, equal length by
    /// construction.
    pub fn compute(
        &self,
        table: &Table,
        args: &ProfileArgs,
    ) -> Result<(Vec<f64>, Vec<f64>), PipelineError> {
        // Contract check for callers that bypass shape_args.
        match (self.uses_diluent(), args.diluent.is_some()) {
            (false, true) => return Err(PipelineError::DiluentNotAccepted(self.name())),
            (true, false) => return Err(PipelineError::DiluentRequired(self.name())),
            _ => {}
        }

        let x = wavenumber_grid(args.range, args.step)?;
        let mut y = vec![0.0; x.len()];

        let nu = table.float_column("nu")?;
        let sw = table.float_column("sw")?;
        let gamma_air = table.float_column("gamma_air").ok();
        let gamma_self = table.float_column("gamma_self").ok();
        let n_air = table.float_column("n_air").ok();
        let molec_id = table.float_column("molec_id").ok();
        let local_iso_id = table.float_column("local_iso_id").ok();

        let env = args.environment;
        let mut used = 0usize;

        for line in 0..table.rows() {
            if let (Some(mol), Some(iso), false) =
                (molec_id, local_iso_id, args.components.is_empty())
            {
                let present = args.components.iter().any(|c| {
                    c.molecule_id == mol[line] as u32 && c.isotopologue_id == iso[line] as u32
                });
                if !present {
                    continue;
                }
            }

            let center = nu[line];
            if center < args.range.min - args.wing || center > args.range.max + args.wing {
                continue;
            }
            used += 1;

            let gamma_d = DOPPLER_WIDTH_COEFF * center * (env.temperature / T_REF).sqrt();
            let gamma_l = args.diluent.map(|diluent| {
                let air = gamma_air.map(|g| g[line]).unwrap_or(DEFAULT_GAMMA_AIR);
                let self_g = gamma_self.map(|g| g[line]).unwrap_or(DEFAULT_GAMMA_SELF);
                let exponent = n_air.map(|n| n[line]).unwrap_or(0.5);
                env.pressure
                    * (diluent.air * air + diluent.self_broadening * self_g)
                    * (T_REF / env.temperature).powf(exponent)
            });

            let half_width = gamma_l.unwrap_or(gamma_d).max(gamma_d);
            let cutoff = args.wing.max(args.wing_hw * half_width);

            for (xi, yi) in x.iter().zip(y.iter_mut()) {
                let delta = xi - center;
                if delta.abs() > cutoff {
                    continue;
                }
                *yi += sw[line] * self.kernel(delta, gamma_l, gamma_d);
            }
        }

        debug!(profile = self.name(), lines = used, points = x.len(), "coefficients computed");
        Ok((x, y))
    }

    /// Normalized kernel value at offset `delta` from the line center.
    fn kernel(&self, delta: f64, gamma_l: Option<f64>, gamma_d: f64) -> f64 {
        match self {
            Self::Lorentz => lorentz(delta, gamma_l.unwrap_or(gamma_d)),
            Self::Gauss | Self::Galatry => doppler(delta, gamma_d),
            Self::Voigt | Self::SdVoigt | Self::Ht => {
                pseudo_voigt(delta, gamma_l.unwrap_or(gamma_d), gamma_d)
            }
        }
    }
}

/// The uniform grid `min, min+step, …` up to and including `max`.
fn wavenumber_grid(range: WavenumberRange, step: f64) -> Result<Vec<f64>, PipelineError> {
    if step <= 0.0 || range.max <= range.min {
        return Err(PipelineError::EmptyGrid {
            min: range.min,
            max: range.max,
            step,
        });
    }
    let count = ((range.max - range.min) / step).floor() as usize + 1;
    Ok((0..count).map(|i| range.min + step * i as f64).collect())
}

fn lorentz(delta: f64, gamma: f64) -> f64 {
    gamma / std::f64::consts::PI / (delta * delta + gamma * gamma)
}

fn doppler(delta: f64, gamma: f64) -> f64 {
    (LN2 / std::f64::consts::PI).sqrt() / gamma * (-LN2 * (delta / gamma).powi(2)).exp()
}

/// Pseudo-Voigt mixing of the Lorentz and Doppler kernels with a combined
/// half-width (Thompson–Cox–Hastings form).
fn pseudo_voigt(delta: f64, gamma_l: f64, gamma_d: f64) -> f64 {
    let g = (gamma_d.powi(5)
        + 2.69269 * gamma_d.powi(4) * gamma_l
        + 2.42843 * gamma_d.powi(3) * gamma_l.powi(2)
        + 4.47163 * gamma_d.powi(2) * gamma_l.powi(3)
        + 0.07842 * gamma_d * gamma_l.powi(4)
        + gamma_l.powi(5))
    .powf(0.2);
    let ratio = gamma_l / g;
    let eta = 1.36603 * ratio - 0.47719 * ratio * ratio + 0.11116 * ratio.powi(3);
    eta * lorentz(delta, g) + (1.0 - eta) * doppler(delta, g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    fn line_table() -> Table {
        Table::new(
            "co2",
            vec![
                ("nu".to_string(), Column::Float(vec![650.0, 651.0])),
                ("sw".to_string(), Column::Float(vec![1.0e-19, 5.0e-20])),
                ("gamma_air".to_string(), Column::Float(vec![0.07, 0.08])),
                ("gamma_self".to_string(), Column::Float(vec![0.09, 0.10])),
                ("n_air".to_string(), Column::Float(vec![0.75, 0.70])),
            ],
        )
        .unwrap()
    }

    fn args_for(profile: LineProfile) -> ProfileArgs {
        profile.shape_args(
            vec![],
            Environment::default(),
            WavenumberRange {
                min: 649.0,
                max: 652.0,
            },
            0.01,
            10.0,
            50.0,
            Diluent::default(),
        )
    }

    #[test]
    fn test_registry_names_round_trip() {
        for profile in LineProfile::ALL {
            assert_eq!(LineProfile::from_name(profile.name()), Some(profile));
        }
        assert_eq!(LineProfile::from_name("Rautian"), None);
        assert_eq!(LineProfile::from_name(""), None);
    }

    #[test]
    fn test_galatry_never_receives_diluent() {
        for profile in LineProfile::ALL {
            let args = args_for(profile);
            match profile {
                LineProfile::Galatry => assert!(args.diluent.is_none()),
                _ => assert!(args.diluent.is_some(), "{} must carry a diluent", profile.name()),
            }
        }
    }

    #[test]
    fn test_diluent_contract_enforced_on_compute() {
        let table = line_table();

        let mut args = args_for(LineProfile::Galatry);
        args.diluent = Some(Diluent::default());
        let err = LineProfile::Galatry.compute(&table, &args).unwrap_err();
        assert_eq!(err, PipelineError::DiluentNotAccepted("Galatry"));

        let mut args = args_for(LineProfile::Voigt);
        args.diluent = None;
        let err = LineProfile::Voigt.compute(&table, &args).unwrap_err();
        assert_eq!(err, PipelineError::DiluentRequired("Voigt"));
    }

    #[test]
    fn test_compute_produces_aligned_grid() {
        let table = line_table();
        for profile in LineProfile::ALL {
            let args = args_for(profile);
            let (x, y) = profile.compute(&table, &args).unwrap();
            assert_eq!(x.len(), y.len());
            assert_eq!(x[0], 649.0);
            assert!(y.iter().all(|v| v.is_finite() && *v >= 0.0));
            // Absorption peaks at the line centers.
            let at_center = y[(x.len() - 1) / 3];
            assert!(at_center > 0.0);
        }
    }

    #[test]
    fn test_component_filter_drops_foreign_lines() {
        let table = Table::new(
            "mixed",
            vec![
                ("nu".to_string(), Column::Float(vec![650.0, 650.0])),
                ("sw".to_string(), Column::Float(vec![1.0e-19, 1.0e-19])),
                ("molec_id".to_string(), Column::Float(vec![2.0, 1.0])),
                ("local_iso_id".to_string(), Column::Float(vec![1.0, 1.0])),
            ],
        )
        .unwrap();

        let profile = LineProfile::Lorentz;
        let mut args = args_for(profile);
        args.components = vec![Component {
            molecule_id: 2,
            isotopologue_id: 1,
        }];
        let (_, y_one) = profile.compute(&table, &args).unwrap();

        args.components.clear();
        let (_, y_both) = profile.compute(&table, &args).unwrap();

        let peak_one = y_one.iter().cloned().fold(0.0, f64::max);
        let peak_both = y_both.iter().cloned().fold(0.0, f64::max);
        assert!((peak_both - 2.0 * peak_one).abs() < peak_one * 1e-9);
    }

    #[test]
    fn test_empty_grid_is_an_error() {
        let table = line_table();
        let profile = LineProfile::Voigt;
        let mut args = args_for(profile);
        args.step = 0.0;
        assert!(matches!(
            profile.compute(&table, &args),
            Err(PipelineError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn test_galatry_matches_doppler_kernel() {
        let table = line_table();
        let (_, galatry) = LineProfile::Galatry
            .compute(&table, &args_for(LineProfile::Galatry))
            .unwrap();
        // Gauss through the same kernel, ignoring its (required) diluent.
        let (_, gauss) = LineProfile::Gauss
            .compute(&table, &args_for(LineProfile::Gauss))
            .unwrap();
        assert_eq!(galatry, gauss);
    }
}
