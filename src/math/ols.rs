//! Closed-form ordinary least squares for a straight line.
//!
//! For the model `y = a x + b` on N points the normal equations reduce to five
//! running sums:
//!
//! ```text
//! Sx = Σx   Sy = Σy   Sxx = Σx²   Sxy = Σxy   D = N·Sxx − Sx²
//! a  = (N·Sxy − Sx·Sy) / D
//! b  = (Sy − a·Sx) / N
//! ```
//!
//! No iteration and no matrix factorisation is needed for the estimates. The
//! 2×2 covariance matrix is only built (with nalgebra) when a caller asks for it.

use nalgebra::Matrix2;

/// Relative threshold under which `D` is treated as zero.
///
/// `D` is a difference of two large, nearly equal numbers when all `x` are
/// (close to) identical, so we compare it against the magnitude of `N·Sxx`.
pub const DEGENERATE_REL_TOL: f64 = 1e-12;

/// Running sums of a paired sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineSums {
    pub n: usize,
    pub sx: f64,
    pub sy: f64,
    pub sxx: f64,
    pub sxy: f64,
}

impl LineSums {
    pub fn from_points(xs: &[f64], ys: &[f64]) -> Self {
        let mut sums = LineSums::default();
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            sums.n += 1;
            sums.sx += x;
            sums.sy += y;
            sums.sxx += x * x;
            sums.sxy += x * y;
        }
        sums
    }

    fn nf(&self) -> f64 {
        self.n as f64
    }

    /// `D = N·Sxx − Sx²`.
    pub fn determinant(&self) -> f64 {
        self.nf() * self.sxx - self.sx * self.sx
    }

    /// True when `D` is zero or numerically indistinguishable from zero.
    ///
    /// NaN sums are *not* degenerate: they propagate into a NaN fit.
    pub fn is_degenerate(&self) -> bool {
        self.determinant().abs() <= DEGENERATE_REL_TOL * (self.nf() * self.sxx).abs()
    }

    /// Sum of squared deviations of `x` from its mean: `Sxx − Sx²/N`.
    pub fn centered_sxx(&self) -> f64 {
        self.sxx - self.sx * self.sx / self.nf()
    }

    pub fn mean_x(&self) -> f64 {
        self.sx / self.nf()
    }

    /// Slope and intercept `(a, b)`.
    pub fn line(&self) -> (f64, f64) {
        let a = (self.nf() * self.sxy - self.sx * self.sy) / self.determinant();
        let b = (self.sy - a * self.sx) / self.nf();
        (a, b)
    }

    /// Covariance of `(a, b)` as `s² (XᵀX)⁻¹` for residual standard error `s`.
    ///
    /// Returns `None` if `XᵀX` is singular.
    pub fn parameter_covariance(&self, sigma_y_resid: f64) -> Option<Matrix2<f64>> {
        let xtx = Matrix2::new(self.sxx, self.sx, self.sx, self.nf());
        let inv = xtx.try_inverse()?;
        Some(inv * (sigma_y_resid * sigma_y_resid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_and_line_for_exact_data() {
        // y = 3x + 2 on x = [0, 1, 2]
        let sums = LineSums::from_points(&[0.0, 1.0, 2.0], &[2.0, 5.0, 8.0]);
        assert_eq!(sums.n, 3);
        assert_eq!(sums.sx, 3.0);
        assert_eq!(sums.sy, 15.0);
        assert_eq!(sums.sxx, 5.0);
        assert_eq!(sums.sxy, 21.0);
        assert_eq!(sums.determinant(), 6.0);
        assert!(!sums.is_degenerate());

        let (a, b) = sums.line();
        assert!((a - 3.0).abs() < 1e-12);
        assert!((b - 2.0).abs() < 1e-12);
        assert!((sums.centered_sxx() - 2.0).abs() < 1e-12);
        assert!((sums.mean_x() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn identical_x_is_degenerate() {
        let sums = LineSums::from_points(&[150.0, 150.0, 150.0, 150.0], &[1.0, 2.0, 3.0, 4.0]);
        assert!(sums.is_degenerate());

        let sums = LineSums::from_points(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]);
        assert!(sums.is_degenerate());

        // 0.1 is not exactly representable, so D may come out as a tiny non-zero value.
        let sums = LineSums::from_points(&[0.1; 7], &[1.0; 7]);
        assert!(sums.is_degenerate());
    }

    #[test]
    fn nan_is_not_degenerate() {
        let sums = LineSums::from_points(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 3.0]);
        assert!(!sums.is_degenerate());
        let (a, b) = sums.line();
        assert!(a.is_nan());
        assert!(b.is_nan());
    }

    #[test]
    fn covariance_diagonal_matches_closed_form() {
        let sums = LineSums::from_points(&[1.0, 2.0, 4.0, 7.0], &[1.0, 3.0, 2.0, 5.0]);
        let s = 0.8;
        let cov = sums.parameter_covariance(s).unwrap();

        let var_a = s * s / sums.centered_sxx();
        let var_b = s * s * (1.0 / 4.0 + sums.mean_x().powi(2) / sums.centered_sxx());
        assert!((cov[(0, 0)] - var_a).abs() < 1e-12);
        assert!((cov[(1, 1)] - var_b).abs() < 1e-12);
        assert!((cov[(0, 1)] - cov[(1, 0)]).abs() < 1e-12);
        // Slope and intercept are anti-correlated for positive mean x.
        assert!(cov[(0, 1)] < 0.0);
    }
}
