//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during generation and fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference constants of the simulated experiment.
///
/// The simulated relationship is `M = rho * V + (M0 - rho * V0)`, i.e. the line
/// of slope `rho` through the reference point `(V0, M0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConstants {
    /// Reference mass (g).
    pub m0: f64,
    /// Reference volume (mL).
    pub v0: f64,
    /// Density (g/mL).
    pub rho: f64,
}

impl Default for ReferenceConstants {
    fn default() -> Self {
        Self {
            m0: 300.0,
            v0: 100.0,
            rho: 1.0,
        }
    }
}

impl ReferenceConstants {
    /// Intercept of the reference line (`M0 - rho * V0`).
    pub fn intercept(&self) -> f64 {
        self.m0 - self.rho * self.v0
    }

    /// Noise-free mass at the given volume.
    pub fn nominal_mass(&self, volume: f64) -> f64 {
        self.rho * volume + self.intercept()
    }
}

/// Parameters of a synthetic sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSpec {
    pub n_points: usize,
    /// Smallest volume (mL), inclusive.
    pub x_min: f64,
    /// Largest volume (mL), inclusive.
    pub x_max: f64,
    /// Relative uncertainty assigned to each mass reading.
    pub err_y: f64,
    /// Relative uncertainty assigned to each volume reading.
    pub err_x: f64,
    /// Half-width (g) of the uniform noise added to each mass.
    pub noise: f64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            n_points: 10,
            x_min: 110.0,
            x_max: 200.0,
            err_y: 0.025,
            err_x: 0.10,
            noise: 5.0,
        }
    }
}

/// A single paired observation: volume `x` and mass `y` with absolute uncertainties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    #[serde(rename = "volume")]
    pub x: f64,
    #[serde(rename = "sigma_volume")]
    pub sigma_x: f64,
    #[serde(rename = "mass")]
    pub y: f64,
    #[serde(rename = "sigma_mass")]
    pub sigma_y: f64,
}

impl Measurement {
    pub fn new(x: f64, y: f64, sigma_x: f64, sigma_y: f64) -> Self {
        Self {
            x,
            sigma_x,
            y,
            sigma_y,
        }
    }

    /// `sigma_y / y`.
    pub fn relative_sigma_y(&self) -> f64 {
        self.sigma_y / self.y
    }

    /// `sigma_x / x`.
    pub fn relative_sigma_x(&self) -> f64 {
        self.sigma_x / self.x
    }
}

/// An ordered, immutable sequence of measurements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    measurements: Vec<Measurement>,
}

impl Dataset {
    pub fn new(measurements: Vec<Measurement>) -> Self {
        Self { measurements }
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.measurements.iter()
    }

    pub fn xs(&self) -> Vec<f64> {
        self.measurements.iter().map(|m| m.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.measurements.iter().map(|m| m.y).collect()
    }

    pub fn stats(&self) -> Option<DatasetStats> {
        DatasetStats::compute(self)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.measurements.iter()
    }
}

/// Summary stats about a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_points: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DatasetStats {
    /// Returns `None` for an empty dataset or one with non-finite coordinates.
    pub fn compute(dataset: &Dataset) -> Option<Self> {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for m in dataset {
            x_min = x_min.min(m.x);
            x_max = x_max.max(m.x);
            y_min = y_min.min(m.y);
            y_max = y_max.max(m.y);
        }

        if !x_min.is_finite() || !x_max.is_finite() || !y_min.is_finite() || !y_max.is_finite() {
            return None;
        }

        Some(Self {
            n_points: dataset.len(),
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }
}

/// Output of a single least-squares fit `y = a*x + b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Slope (the fitted density, g/mL).
    pub a: f64,
    /// Intercept (g).
    pub b: f64,
    /// Standard error of the slope.
    pub sigma_a: f64,
    /// Standard error of the intercept.
    pub sigma_b: f64,
    /// Residual standard error (N-2 degrees of freedom).
    pub sigma_y_resid: f64,
    /// Predicted mass per input measurement, aligned by index.
    pub y_pred: Vec<f64>,
    /// Number of fitted points.
    pub n: usize,
    /// Reference constants echoed for reporting.
    pub reference: ReferenceConstants,
}

impl FitResult {
    /// Evaluate the fitted line.
    pub fn predict(&self, x: f64) -> f64 {
        self.a * x + self.b
    }
}

/// Propagated parameter uncertainty around the fit line, sorted by `x`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UncertaintyBand {
    pub x: Vec<f64>,
    pub y_fit: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl UncertaintyBand {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and `DFIT_*` environment variables).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub reference: ReferenceConstants,
    pub sample: SampleSpec,
    /// Seed for the noise generator; `None` draws one from entropy.
    pub seed: Option<u64>,
    /// Fit measurements from a CSV file instead of generating them.
    pub input: Option<PathBuf>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_latex: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
    pub export_svg: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            reference: ReferenceConstants::default(),
            sample: SampleSpec::default(),
            seed: None,
            input: None,
            plot: true,
            plot_width: 80,
            plot_height: 24,
            export_latex: None,
            export_csv: None,
            export_fit: None,
            export_svg: None,
        }
    }
}

/// A saved fit file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub reference: ReferenceConstants,
    pub measurements: Dataset,
    pub fit: FitResult,
    pub band: UncertaintyBand,
}
