//! Straight-line fit of mass against volume.
//!
//! Given a dataset of `(x, y)` pairs we compute:
//! - the unweighted OLS line `y = a x + b`
//! - the prediction at every input `x`, in input order
//! - the residual standard error with N−2 degrees of freedom
//! - the standard errors of `a` and `b`
//!
//! The per-point uncertainties carried by the dataset are deliberately *not*
//! used as weights.

use nalgebra::Matrix2;

use crate::data::MIN_POINTS;
use crate::domain::{Dataset, FitResult, ReferenceConstants};
use crate::error::FitError;
use crate::math::LineSums;

/// Fit `y = a x + b` to a dataset.
///
/// `reference` is only echoed into the result for reporting.
pub fn fit_dataset(
    dataset: &Dataset,
    reference: &ReferenceConstants,
) -> Result<FitResult, FitError> {
    let n = dataset.len();
    if n < MIN_POINTS {
        return Err(FitError::InsufficientData { n });
    }

    let xs = dataset.xs();
    let ys = dataset.ys();
    let sums = LineSums::from_points(&xs, &ys);

    if sums.is_degenerate() {
        return Err(FitError::DegenerateInput(format!(
            "volumes have no spread (N·Sxx − Sx² = {:e}); cannot fit a slope.",
            sums.determinant()
        )));
    }

    let (a, b) = sums.line();
    let y_pred: Vec<f64> = xs.iter().map(|&x| a * x + b).collect();

    let sse: f64 = ys
        .iter()
        .zip(y_pred.iter())
        .map(|(&y, &yp)| (y - yp) * (y - yp))
        .sum();
    let sigma_y_resid = (sse / (n - 2) as f64).sqrt();

    let sxx_c = sums.centered_sxx();
    let sigma_a = sigma_y_resid / sxx_c.sqrt();
    let x_bar = sums.mean_x();
    let sigma_b = sigma_y_resid * (1.0 / n as f64 + x_bar * x_bar / sxx_c).sqrt();

    log::debug!("fit n={n}: a={a:.6}±{sigma_a:.6} b={b:.4}±{sigma_b:.4} s={sigma_y_resid:.4}");

    Ok(FitResult {
        a,
        b,
        sigma_a,
        sigma_b,
        sigma_y_resid,
        y_pred,
        n,
        reference: *reference,
    })
}

impl FitResult {
    /// `y[i] - y_pred[i]` for the dataset this result was fitted on.
    pub fn residuals(&self, dataset: &Dataset) -> Vec<f64> {
        dataset
            .iter()
            .zip(self.y_pred.iter())
            .map(|(m, &yp)| m.y - yp)
            .collect()
    }

    /// Full covariance of `(a, b)`; the diagonal is `(sigma_a², sigma_b²)`.
    pub fn parameter_covariance(&self, dataset: &Dataset) -> Option<Matrix2<f64>> {
        let sums = LineSums::from_points(&dataset.xs(), &dataset.ys());
        sums.parameter_covariance(self.sigma_y_resid)
    }

    /// Deviation of the fitted density from the reference density, in standard errors.
    pub fn slope_pull(&self) -> Option<f64> {
        if self.sigma_a.is_finite() && self.sigma_a > 0.0 {
            Some((self.a - self.reference.rho) / self.sigma_a)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_dataset, sample_rng};
    use crate::domain::{Measurement, SampleSpec};

    fn dataset(points: &[(f64, f64)]) -> Dataset {
        let measurements = points
            .iter()
            .map(|&(x, y)| Measurement::new(x, y, 0.0, 0.0))
            .collect();
        Dataset::new(measurements)
    }

    #[test]
    fn exact_three_point_line() {
        let data = dataset(&[(100.0, 400.0), (150.0, 450.0), (200.0, 500.0)]);
        let fit = fit_dataset(&data, &ReferenceConstants::default()).unwrap();

        assert!((fit.a - 1.0).abs() < 1e-12);
        assert!((fit.b - 300.0).abs() < 1e-9);
        assert_eq!(fit.sigma_a, 0.0);
        assert_eq!(fit.sigma_b, 0.0);
        assert_eq!(fit.sigma_y_resid, 0.0);
        assert_eq!(fit.n, 3);
        assert_eq!(fit.y_pred.len(), 3);
        for (got, want) in fit.y_pred.iter().zip([400.0, 450.0, 500.0]) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn recovers_noise_free_generated_line() {
        let reference = ReferenceConstants {
            m0: 120.0,
            v0: 40.0,
            rho: 0.85,
        };
        let spec = SampleSpec {
            noise: 0.0,
            err_x: 0.0,
            err_y: 0.0,
            n_points: 25,
            ..SampleSpec::default()
        };
        let data = generate_dataset(&mut sample_rng(3), &reference, &spec).unwrap();
        let fit = fit_dataset(&data, &reference).unwrap();

        assert!((fit.a - 0.85).abs() < 1e-9);
        assert!((fit.b - reference.intercept()).abs() < 1e-6);
        assert!(fit.sigma_a < 1e-9);
        assert!(fit.sigma_b < 1e-6);
    }

    #[test]
    fn noisy_fit_is_close_and_idempotent() {
        let reference = ReferenceConstants::default();
        let spec = SampleSpec::default();
        let data = generate_dataset(&mut sample_rng(42), &reference, &spec).unwrap();

        let first = fit_dataset(&data, &reference).unwrap();
        let second = fit_dataset(&data, &reference).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.a.to_bits(), second.a.to_bits());
        assert_eq!(first.sigma_b.to_bits(), second.sigma_b.to_bits());

        assert_eq!(first.y_pred.len(), data.len());
        assert!(first.sigma_a > 0.0);
        assert!(first.sigma_b > first.sigma_a);
        // ±5 g of noise over a 90 mL span cannot move the slope far from 1.
        assert!((first.a - 1.0).abs() < 0.2, "slope {}", first.a);
        assert_eq!(first.reference, reference);
    }

    #[test]
    fn textbook_residual_error() {
        // Residuals for this set are [-0.2, 0.4, -0.2] around y = 2x + 1.2.
        let data = dataset(&[(0.0, 1.0), (1.0, 3.6), (2.0, 5.0)]);
        let fit = fit_dataset(&data, &ReferenceConstants::default()).unwrap();

        assert!((fit.a - 2.0).abs() < 1e-12);
        assert!((fit.b - 1.2).abs() < 1e-12);
        let s = (0.24f64 / 1.0).sqrt();
        assert!((fit.sigma_y_resid - s).abs() < 1e-12);
        assert!((fit.sigma_a - s / 2.0f64.sqrt()).abs() < 1e-12);
        assert!((fit.sigma_b - s * (1.0 / 3.0 + 1.0 / 2.0f64).sqrt()).abs() < 1e-12);

        let residuals = fit.residuals(&data);
        for (got, want) in residuals.iter().zip([-0.2, 0.4, -0.2]) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn preserves_input_order() {
        let data = dataset(&[(3.0, 7.0), (1.0, 3.0), (2.0, 5.0), (0.0, 1.0)]);
        let fit = fit_dataset(&data, &ReferenceConstants::default()).unwrap();
        for (m, yp) in data.iter().zip(fit.y_pred.iter()) {
            assert!((m.y - yp).abs() < 1e-12);
        }
    }

    #[test]
    fn too_few_points() {
        for pts in [vec![], vec![(1.0, 1.0)], vec![(1.0, 1.0), (2.0, 2.0)]] {
            let err = fit_dataset(&dataset(&pts), &ReferenceConstants::default()).unwrap_err();
            assert_eq!(err, FitError::InsufficientData { n: pts.len() });
        }
    }

    #[test]
    fn identical_volumes_are_degenerate() {
        let data = dataset(&[(150.0, 440.0), (150.0, 450.0), (150.0, 455.0)]);
        let err = fit_dataset(&data, &ReferenceConstants::default()).unwrap_err();
        assert!(matches!(err, FitError::DegenerateInput(_)));
    }

    #[test]
    fn nan_coordinates_propagate() {
        let data = dataset(&[(1.0, 1.0), (2.0, f64::NAN), (3.0, 3.0)]);
        let fit = fit_dataset(&data, &ReferenceConstants::default()).unwrap();
        assert!(fit.a.is_nan());
        assert!(fit.sigma_y_resid.is_nan());
        assert_eq!(fit.y_pred.len(), 3);
    }

    #[test]
    fn covariance_and_pull() {
        let reference = ReferenceConstants::default();
        let spec = SampleSpec::default();
        let data = generate_dataset(&mut sample_rng(5), &reference, &spec).unwrap();
        let fit = fit_dataset(&data, &reference).unwrap();

        let cov = fit.parameter_covariance(&data).unwrap();
        assert!((cov[(0, 0)].sqrt() - fit.sigma_a).abs() < 1e-9 * fit.sigma_a.max(1.0));
        assert!((cov[(1, 1)].sqrt() - fit.sigma_b).abs() < 1e-6 * fit.sigma_b.max(1.0));

        let pull = fit.slope_pull().unwrap();
        assert!((pull - (fit.a - 1.0) / fit.sigma_a).abs() < 1e-12);

        let exact = dataset(&[(100.0, 400.0), (150.0, 450.0), (200.0, 500.0)]);
        let exact_fit = fit_dataset(&exact, &reference).unwrap();
        assert_eq!(exact_fit.slope_pull(), None);
    }
}
