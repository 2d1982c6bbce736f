//! Export measurements (with fitted values) to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts, and to be readable again with `dfit fit --input`.

use std::path::Path;

use serde::Serialize;

use crate::domain::{Dataset, FitResult};
use crate::error::AppError;
use crate::fit::band::ensure_aligned;

#[derive(Debug, Serialize)]
struct ExportRow {
    volume: f64,
    sigma_volume: f64,
    mass: f64,
    sigma_mass: f64,
    mass_fit: f64,
    residual: f64,
}

/// Write per-measurement results to a CSV file.
pub fn write_measurements_csv(
    path: &Path,
    dataset: &Dataset,
    fit: &FitResult,
) -> Result<(), AppError> {
    ensure_aligned(dataset, fit)?;

    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;

    for (m, &yp) in dataset.iter().zip(fit.y_pred.iter()) {
        writer
            .serialize(ExportRow {
                volume: m.x,
                sigma_volume: m.sigma_x,
                mass: m.y,
                sigma_mass: m.sigma_y,
                mass_fit: yp,
                residual: m.y - yp,
            })
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    log::info!(
        "{} measurements exported to {}",
        dataset.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Measurement, ReferenceConstants};
    use crate::fit::fit_dataset;

    #[test]
    fn csv_has_header_and_rows() {
        let data = Dataset::new(vec![
            Measurement::new(100.0, 400.0, 10.0, 10.0),
            Measurement::new(150.0, 450.0, 15.0, 11.25),
            Measurement::new(200.0, 500.0, 20.0, 12.5),
        ]);
        let fit = fit_dataset(&data, &ReferenceConstants::default()).unwrap();
        let name = format!("dfit_export_{}.csv", std::process::id());
        let path = std::env::temp_dir().join(name);

        write_measurements_csv(&path, &data, &fit).unwrap();
        let txt = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let lines: Vec<&str> = txt.lines().collect();
        let header = "volume,sigma_volume,mass,sigma_mass,mass_fit,residual";
        assert_eq!(lines[0], header);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "150.0,15.0,450.0,11.25,450.0,0.0");
    }
}
