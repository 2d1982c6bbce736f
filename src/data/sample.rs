//! Synthetic mass-vs-volume sample generation.
//!
//! Volumes are evenly spaced over `[x_min, x_max]`. Each mass is the reference
//! line `M = rho * V + (M0 - rho * V0)` plus uniform noise in `[-noise, +noise]`.
//! Uncertainties are fixed fractions of the *observed* readings, the way an
//! instrument tolerance would be applied to a real measurement.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Uniform};

use crate::domain::{Dataset, Measurement, ReferenceConstants, SampleSpec};
use crate::error::FitError;

/// Smallest sample that can be fitted (two parameters + one degree of freedom).
pub const MIN_POINTS: usize = 3;

/// Largest accepted noise half-width; the sampler needs `2 * noise` plus headroom.
pub const MAX_NOISE: f64 = f64::MAX / 4.0;

/// Build the noise generator for a seed.
pub fn sample_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Use the requested seed, or draw one from OS entropy.
///
/// Runs always end up with a concrete seed so an unseeded sample can be
/// reproduced from the reported value.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| StdRng::from_entropy().r#gen())
}

/// Generate a synthetic dataset.
pub fn generate_dataset<R: Rng + ?Sized>(
    rng: &mut R,
    reference: &ReferenceConstants,
    spec: &SampleSpec,
) -> Result<Dataset, FitError> {
    validate_spec(spec)?;

    let noise = Uniform::new_inclusive(-spec.noise, spec.noise);
    let volumes = linspace(spec.x_min, spec.x_max, spec.n_points);

    let measurements: Vec<Measurement> = volumes
        .into_iter()
        .map(|x| {
            let y = reference.nominal_mass(x) + noise.sample(rng);
            Measurement::new(x, y, x * spec.err_x, y * spec.err_y)
        })
        .collect();

    log::debug!(
        "generated {} measurements over V=[{}, {}] (noise=±{}, err_M={}, err_V={})",
        measurements.len(),
        spec.x_min,
        spec.x_max,
        spec.noise,
        spec.err_y,
        spec.err_x
    );

    Ok(Dataset::new(measurements))
}

fn validate_spec(spec: &SampleSpec) -> Result<(), FitError> {
    if spec.n_points < MIN_POINTS {
        return Err(FitError::InvalidArgument(format!(
            "point count must be >= {MIN_POINTS}, got {}.",
            spec.n_points
        )));
    }
    if !(spec.x_min.is_finite() && spec.x_max.is_finite() && spec.x_min < spec.x_max) {
        return Err(FitError::InvalidArgument(format!(
            "volume range must satisfy x_min < x_max, got [{}, {}].",
            spec.x_min, spec.x_max
        )));
    }
    // Evenly spaced volumes need a representable span.
    if !(spec.x_max - spec.x_min).is_finite() {
        return Err(FitError::InvalidArgument(format!(
            "volume range [{}, {}] is too wide.",
            spec.x_min, spec.x_max
        )));
    }

    let fractions = [
        ("err_y", spec.err_y),
        ("err_x", spec.err_x),
        ("noise", spec.noise),
    ];
    for (name, value) in fractions {
        if !(value.is_finite() && value >= 0.0) {
            return Err(FitError::InvalidArgument(format!(
                "{name} must be a non-negative number, got {value}."
            )));
        }
    }
    if spec.noise > MAX_NOISE {
        return Err(FitError::InvalidArgument(format!(
            "noise must be <= {MAX_NOISE:e}, got {:e}.",
            spec.noise
        )));
    }
    Ok(())
}

/// `n` evenly spaced values over `[start, stop]`; the last value is exactly `stop`.
fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as f64 - 1.0);
            let mut values: Vec<f64> = (0..n - 1).map(|i| start + i as f64 * step).collect();
            values.push(stop);
            values
        }
    }
}
