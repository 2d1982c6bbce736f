//! Formatted terminal output: run summary and per-measurement table.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::domain::{Dataset, FitResult};
use crate::error::AppError;
use crate::fit::band::ensure_aligned;

/// Where the measurements of a run came from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Generated { seed: u64 },
    Csv { path: String, rows_skipped: usize },
}

/// Legend label for the fitted line, e.g. `y = (1.0021 ± 0.0307)x + (299.61 ± 4.95)`.
pub fn fit_label(fit: &FitResult) -> String {
    format!(
        "y = ({:.4} ± {:.4})x + ({:.2} ± {:.2})",
        fit.a, fit.sigma_a, fit.b, fit.sigma_b
    )
}

/// Format the run summary (dataset stats + fit parameters + reference comparison).
pub fn format_run_summary(dataset: &Dataset, fit: &FitResult, source: &DataSource) -> String {
    let mut out = String::new();
    let r = &fit.reference;

    out.push_str("=== dfit - Least Squares Regression: Mass vs. Volume ===\n");
    match source {
        DataSource::Generated { seed } => {
            out.push_str(&format!("Source: synthetic (seed={seed})\n"));
        }
        DataSource::Csv { path, rows_skipped } => {
            out.push_str(&format!("Source: {path} ({rows_skipped} rows skipped)\n"));
        }
    }
    out.push_str(&format!(
        "Reference: M0={} g | V0={} mL | rho={} g/mL\n",
        r.m0, r.v0, r.rho
    ));

    match dataset.stats() {
        Some(stats) => out.push_str(&format!(
            "Points: n={} | V=[{:.3}, {:.3}] mL | M=[{:.3}, {:.3}] g\n",
            stats.n_points, stats.x_min, stats.x_max, stats.y_min, stats.y_max
        )),
        None => out.push_str(&format!("Points: n={} (non-finite values)\n", dataset.len())),
    }

    out.push_str("\nFit:\n");
    out.push_str(&format!("- {}\n", fit_label(fit)));
    out.push_str(&format!("- a (density) : {:.6} ± {:.6} g/mL\n", fit.a, fit.sigma_a));
    out.push_str(&format!("- b (intercept): {:.4} ± {:.4} g\n", fit.b, fit.sigma_b));
    out.push_str(&format!(
        "- residual std error: {:.4} g (dof={})\n",
        fit.sigma_y_resid,
        fit.n.saturating_sub(2)
    ));
    out.push_str(&format!("- expected: a={} b={}\n", r.rho, r.intercept()));
    if let Some(pull) = fit.slope_pull() {
        out.push_str(&format!("- density pull: {pull:+.2} sigma\n"));
    }

    out
}

/// Format the per-measurement table (observations, predictions, residuals).
pub fn format_measurements(dataset: &Dataset, fit: &FitResult) -> Result<String, AppError> {
    ensure_aligned(dataset, fit)?;

    let mut out = String::new();
    out.push_str(
        format!(
            "{:>4} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
            "i", "V", "dV", "M", "dM", "M_fit", "residual"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<4} {:-<10} {:-<10} {:-<10} {:-<10} {:-<10} {:-<10}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (i, (m, yp)) in dataset.iter().zip(fit.y_pred.iter()).enumerate() {
        out.push_str(
            format!(
                "{:>4} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}\n",
                i + 1,
                m.x,
                m.sigma_x,
                m.y,
                m.sigma_y,
                yp,
                m.y - yp
            )
            .trim_end(),
        );
        out.push('\n');
    }

    Ok(out)
}
