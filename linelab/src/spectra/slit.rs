//! Instrumental slit functions and the convolution stage.

use tracing::debug;

const LN2: f64 = std::f64::consts::LN_2;
const PI: f64 = std::f64::consts::PI;

/// The fixed registry of instrumental functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlitFunction {
    Rectangular,
    Triangular,
    Gaussian,
    Diffraction,
    Michelson,
    Dispersion,
}

impl SlitFunction {
    /// Resolves a registry entry; lookup is case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "rectangular" => Some(Self::Rectangular),
            "triangular" => Some(Self::Triangular),
            "gaussian" => Some(Self::Gaussian),
            "diffraction" => Some(Self::Diffraction),
            "michelson" => Some(Self::Michelson),
            "dispersion" => Some(Self::Dispersion),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Rectangular => "rectangular",
            Self::Triangular => "triangular",
            Self::Gaussian => "gaussian",
            Self::Diffraction => "diffraction",
            Self::Michelson => "michelson",
            Self::Dispersion => "dispersion",
        }
    }

    /// Kernel value at offset `x` for the given resolution.
    fn value(&self, x: f64, resolution: f64) -> f64 {
        let g = resolution;
        match self {
            Self::Rectangular => {
                if x.abs() <= g / 2.0 {
                    1.0 / g
                } else {
                    0.0
                }
            }
            Self::Triangular => {
                if x.abs() <= g {
                    (1.0 - x.abs() / g) / g
                } else {
                    0.0
                }
            }
            Self::Gaussian => {
                let half = g / 2.0;
                (LN2 / PI).sqrt() / half * (-LN2 * (x / half).powi(2)).exp()
            }
            Self::Diffraction => {
                if x == 0.0 {
                    1.0 / g
                } else {
                    let t = PI * x / g;
                    (t.sin() / t).powi(2) / g
                }
            }
            Self::Michelson => {
                if x == 0.0 {
                    2.0 / g
                } else {
                    let t = 2.0 * PI * x / g;
                    2.0 / g * t.sin() / t
                }
            }
            Self::Dispersion => g / (2.0 * PI) / (x * x + (g / 2.0).powi(2)),
        }
    }
}

/// Applies an instrumental function to `(x, y)` if one is selected.
///
/// An empty or unrecognized function name is an exact pass-through of the
/// input, not an error. Otherwise the spectrum is convolved with the slit
/// kernel sampled on the spectrum's own step out to `af_wing` on each side;
/// the output is shorter than the input by one kernel wing at each edge.
pub fn convolve_spectrum(
    x: Vec<f64>,
    y: Vec<f64>,
    instrumental_fn: &str,
    resolution: f64,
    af_wing: f64,
) -> (Vec<f64>, Vec<f64>) {
    let slit = match SlitFunction::from_name(instrumental_fn) {
        Some(slit) => slit,
        None => return (x, y),
    };
    if x.len() < 2 {
        return (x, y);
    }

    let step = x[1] - x[0];
    let half = (af_wing / step).floor() as usize;

    // Kernel sampled on the spectrum grid, normalized to unit area.
    let mut kernel: Vec<f64> = (0..=2 * half)
        .map(|j| slit.value((j as f64 - half as f64) * step, resolution))
        .collect();
    let area: f64 = kernel.iter().sum::<f64>() * step;
    if area > 0.0 {
        for k in &mut kernel {
            *k /= area;
        }
    }

    if 2 * half >= x.len() {
        debug!(slit = slit.name(), "spectrum narrower than slit wing, nothing left after edges");
        return (Vec::new(), Vec::new());
    }

    let out_len = x.len() - 2 * half;
    let mut out_y = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let mut acc = 0.0;
        for (j, k) in kernel.iter().enumerate() {
            acc += y[i + j] * k;
        }
        out_y.push(acc * step);
    }
    let out_x = x[half..half + out_len].to_vec();

    debug!(
        slit = slit.name(),
        resolution,
        input = x.len(),
        output = out_len,
        "spectrum convolved"
    );
    (out_x, out_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..n).map(|i| 600.0 + 0.01 * i as f64).collect();
        let y: Vec<f64> = (0..n).map(|i| (i as f64 * 0.1).sin().abs()).collect();
        (x, y)
    }

    #[test]
    fn test_unrecognized_name_is_exact_pass_through() {
        let (x, y) = ramp(100);
        for name in ["", "boxcar", "RECTANGULARISH", "none"] {
            let (out_x, out_y) = convolve_spectrum(x.clone(), y.clone(), name, 0.1, 1.0);
            assert_eq!(out_x, x);
            assert_eq!(out_y, y);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(
            SlitFunction::from_name("Rectangular"),
            Some(SlitFunction::Rectangular)
        );
        assert_eq!(
            SlitFunction::from_name("MICHELSON"),
            Some(SlitFunction::Michelson)
        );
    }

    #[test]
    fn test_convolution_trims_edges() {
        let (x, y) = ramp(500);
        let (out_x, out_y) = convolve_spectrum(x.clone(), y, "gaussian", 0.05, 0.5);
        assert_eq!(out_x.len(), out_y.len());
        assert!(out_x.len() < x.len());
        // Interior grid is preserved.
        let trimmed = (x.len() - out_x.len()) / 2;
        assert_eq!(out_x[0], x[trimmed]);
    }

    #[test]
    fn test_convolution_preserves_constant_level() {
        // A normalized kernel applied to a flat spectrum must return it.
        let x: Vec<f64> = (0..400).map(|i| 600.0 + 0.01 * i as f64).collect();
        let y = vec![2.5; 400];
        for slit in [
            "rectangular",
            "triangular",
            "gaussian",
            "diffraction",
            "michelson",
            "dispersion",
        ] {
            let (_, out_y) = convolve_spectrum(x.clone(), y.clone(), slit, 0.05, 0.5);
            assert!(!out_y.is_empty(), "{} trimmed everything", slit);
            for v in &out_y {
                assert!((v - 2.5).abs() < 1e-6, "{} distorted a flat level", slit);
            }
        }
    }

    #[test]
    fn test_spectrum_narrower_than_wing_empties() {
        let (x, y) = ramp(10);
        let (out_x, out_y) = convolve_spectrum(x, y, "rectangular", 0.05, 1.0);
        assert!(out_x.is_empty());
        assert!(out_y.is_empty());
    }
}
