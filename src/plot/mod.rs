//! Fit visualisation.
//!
//! - `ascii`: deterministic terminal plot
//! - `svg`: Plotters chart written to an SVG file
//!
//! Both share the axis bounds computed here so the terminal, SVG and TUI views
//! frame the data identically.

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;

use crate::domain::{Dataset, UncertaintyBand};

/// Fraction of the data span added on each side of an axis.
pub const AXIS_PAD: f64 = 0.05;

/// Padded `[x_min, x_max]` and `[y_min, y_max]` covering error bars and band.
///
/// Returns `None` when the extent is empty or non-finite.
pub fn chart_bounds(dataset: &Dataset, band: &UncertaintyBand) -> Option<([f64; 2], [f64; 2])> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for m in dataset {
        x_min = x_min.min(m.x - m.sigma_x);
        x_max = x_max.max(m.x + m.sigma_x);
        y_min = y_min.min(m.y - m.sigma_y);
        y_max = y_max.max(m.y + m.sigma_y);
    }
    for (&lo, &hi) in band.lower.iter().zip(band.upper.iter()) {
        y_min = y_min.min(lo);
        y_max = y_max.max(hi);
    }

    let finite = x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite();
    if !finite || x_max <= x_min || y_max <= y_min {
        return None;
    }

    let (x0, x1) = pad_range(x_min, x_max, AXIS_PAD);
    let (y0, y1) = pad_range(y_min, y_max, AXIS_PAD);
    Some(([x0, x1], [y0, y1]))
}

/// Zip parallel coordinate slices into `(x, y)` points.
pub(crate) fn xy_pairs(xs: &[f64], ys: &[f64]) -> Vec<(f64, f64)> {
    xs.iter().copied().zip(ys.iter().copied()).collect()
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}
