//! Uncertainty band around a fitted line.
//!
//! The band propagates the parameter standard errors only:
//!
//! ```text
//! u(x) = sqrt((x·σa)² + σb²)
//! ```
//!
//! It ignores the covariance of `a` and `b`, so it is wider than the exact
//! confidence band away from the mean `x`. It says nothing about residual scatter.

use std::cmp::Ordering;

use crate::domain::{Dataset, FitResult, UncertaintyBand};
use crate::error::AppError;

/// Half-width of the band at `x`.
pub fn band_half_width(fit: &FitResult, x: f64) -> f64 {
    ((x * fit.sigma_a).powi(2) + fit.sigma_b * fit.sigma_b).sqrt()
}

/// Sort the dataset by `x` and evaluate the prediction ± band at each point.
///
/// Fails if `fit` was not computed on a dataset of the same length.
pub fn uncertainty_band(dataset: &Dataset, fit: &FitResult) -> Result<UncertaintyBand, AppError> {
    ensure_aligned(dataset, fit)?;

    let mut order: Vec<usize> = (0..dataset.len()).collect();
    let measurements = dataset.measurements();
    // Stable sort; ties keep input order.
    order.sort_by(|&i, &j| {
        measurements[i]
            .x
            .partial_cmp(&measurements[j].x)
            .unwrap_or(Ordering::Equal)
    });

    let mut band = UncertaintyBand {
        x: Vec::with_capacity(order.len()),
        y_fit: Vec::with_capacity(order.len()),
        lower: Vec::with_capacity(order.len()),
        upper: Vec::with_capacity(order.len()),
    };
    for i in order {
        let x = measurements[i].x;
        let y = fit.y_pred[i];
        let u = band_half_width(fit, x);
        band.x.push(x);
        band.y_fit.push(y);
        band.lower.push(y - u);
        band.upper.push(y + u);
    }

    Ok(band)
}

pub(crate) fn ensure_aligned(dataset: &Dataset, fit: &FitResult) -> Result<(), AppError> {
    if fit.y_pred.len() != dataset.len() {
        return Err(AppError::new(
            4,
            format!(
                "Fit has {} predictions but the dataset has {} measurements.",
                fit.y_pred.len(),
                dataset.len()
            ),
        ));
    }
    Ok(())
}
