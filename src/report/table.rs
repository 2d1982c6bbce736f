//! Export table: measurements as "value ± uncertainty" strings.
//!
//! Each measurement becomes one row with four columns:
//!
//! | column | content |
//! | - | - |
//! | mass | `M \pm dM` (3 decimals) |
//! | mass fraction | `dM / M` (3 decimals) |
//! | volume | `V \pm dV` (3 decimals) |
//! | volume fraction | `dV / V` (3 decimals) |
//!
//! The strings are LaTeX math fragments, so the headers and cells are emitted
//! unescaped.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Utc;

use crate::domain::{Dataset, FitResult, Measurement};
use crate::error::AppError;
use crate::fit::band::ensure_aligned;

pub const HEADER_MASS: &str = r"$(M_i \pm \delta M_i) \ g$";
pub const HEADER_MASS_FRACTION: &str = r"$\frac{\delta M_i}{M_i}$";
pub const HEADER_VOLUME: &str = r"$(V_i \pm \delta V_i) \ ml$";
pub const HEADER_VOLUME_FRACTION: &str = r"$\frac{\delta V_i}{V_i}$";

/// One formatted table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub mass: String,
    pub mass_fraction: String,
    pub volume: String,
    pub volume_fraction: String,
}

impl TableRow {
    fn from_measurement(m: &Measurement) -> Self {
        Self {
            mass: value_pm(m.y, m.sigma_y),
            mass_fraction: format!("{:.3}", m.relative_sigma_y()),
            volume: value_pm(m.x, m.sigma_x),
            volume_fraction: format!("{:.3}", m.relative_sigma_x()),
        }
    }

    fn cells(&self) -> [&str; 4] {
        [
            &self.mass,
            &self.mass_fraction,
            &self.volume,
            &self.volume_fraction,
        ]
    }
}

/// In-memory export table, one row per measurement in dataset order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub headers: [&'static str; 4],
    pub rows: Vec<TableRow>,
}

impl ExportTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a booktabs `tabular` (no index column).
    pub fn to_latex(&self) -> String {
        let mut out = String::new();
        out.push_str("\\begin{tabular}{llll}\n");
        out.push_str("\\toprule\n");
        out.push_str(&self.headers.join(" & "));
        out.push_str(" \\\\\n");
        out.push_str("\\midrule\n");
        for row in &self.rows {
            out.push_str(&row.cells().join(" & "));
            out.push_str(" \\\\\n");
        }
        out.push_str("\\bottomrule\n");
        out.push_str("\\end{tabular}\n");
        out
    }
}

/// Build the export table for a fitted dataset.
pub fn build_table(dataset: &Dataset, fit: &FitResult) -> Result<ExportTable, AppError> {
    ensure_aligned(dataset, fit)?;
    Ok(ExportTable {
        headers: [
            HEADER_MASS,
            HEADER_MASS_FRACTION,
            HEADER_VOLUME,
            HEADER_VOLUME_FRACTION,
        ],
        rows: dataset.iter().map(TableRow::from_measurement).collect(),
    })
}

/// Render the LaTeX table and optionally write it to `path`.
///
/// The markup is returned either way; the written file additionally starts with
/// a `%` comment recording when it was generated.
pub fn export_latex_table(table: &ExportTable, path: Option<&Path>) -> Result<String, AppError> {
    let latex = table.to_latex();

    if let Some(path) = path {
        let mut file = File::create(path).map_err(|e| {
            AppError::new(
                2,
                format!("Failed to create LaTeX table '{}': {e}", path.display()),
            )
        })?;
        writeln!(file, "% generated by dfit at {}", Utc::now().to_rfc3339())
            .and_then(|_| file.write_all(latex.as_bytes()))
            .map_err(|e| AppError::new(2, format!("Failed to write LaTeX table: {e}")))?;
        log::info!("LaTeX table exported to {}", path.display());
    }

    Ok(latex)
}

fn value_pm(value: f64, sigma: f64) -> String {
    format!("{value:.3} \\pm {sigma:.3}")
}
