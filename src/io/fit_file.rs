//! Read/write fit JSON files.
//!
//! Fit JSON is the "portable" representation of a run:
//! - reference constants and the measurements that were fitted
//! - the fit parameters, uncertainties and predictions
//! - the sorted uncertainty band, for plotting without refitting
//!
//! The schema is defined by `domain::FitFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{Dataset, FitFile, FitResult};
use crate::error::AppError;
use crate::fit::uncertainty_band;

pub const TOOL_NAME: &str = "dfit";

/// Assemble the JSON document for a fitted dataset.
pub fn build_fit_file(dataset: &Dataset, fit: &FitResult) -> Result<FitFile, AppError> {
    let band = uncertainty_band(dataset, fit)?;
    Ok(FitFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        reference: fit.reference,
        measurements: dataset.clone(),
        fit: fit.clone(),
        band,
    })
}

/// Write a fit JSON file.
pub fn write_fit_json(path: &Path, dataset: &Dataset, fit: &FitResult) -> Result<(), AppError> {
    let doc = build_fit_file(dataset, fit)?;
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create fit JSON '{}': {e}", path.display()),
        )
    })?;

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(2, format!("Failed to write fit JSON: {e}")))?;

    log::info!("fit written to {}", path.display());
    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open fit JSON '{}': {e}", path.display()),
        )
    })?;
    let doc: FitFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid fit JSON: {e}")))?;

    if doc.fit.y_pred.len() != doc.measurements.len() {
        return Err(AppError::new(
            2,
            format!(
                "Invalid fit JSON: {} predictions for {} measurements.",
                doc.fit.y_pred.len(),
                doc.measurements.len()
            ),
        ));
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_dataset, sample_rng};
    use crate::domain::{ReferenceConstants, SampleSpec};
    use crate::fit::fit_dataset;

    #[test]
    fn saved_fit_reloads() {
        let reference = ReferenceConstants {
            m0: 250.0,
            v0: 80.0,
            rho: 0.92,
        };
        let spec = SampleSpec::default();
        let data = generate_dataset(&mut sample_rng(21), &reference, &spec).unwrap();
        let fit = fit_dataset(&data, &reference).unwrap();
        let name = format!("dfit_fit_{}.json", std::process::id());
        let path = std::env::temp_dir().join(name);

        write_fit_json(&path, &data, &fit).unwrap();
        let doc = read_fit_json(&path);
        let raw = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let doc = doc.unwrap();

        assert_eq!(doc.tool, "dfit");
        assert_eq!(doc.reference, reference);
        assert_eq!(doc.measurements, data);
        assert_eq!(doc.fit, fit);
        assert_eq!(doc.band.len(), data.len());
        assert!(raw.contains("\"sigma_volume\""));
    }

    #[test]
    fn rejects_garbage() {
        let name = format!("dfit_bad_{}.json", std::process::id());
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, "{\"tool\": \"dfit\"}").unwrap();
        let err = read_fit_json(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().starts_with("Invalid fit JSON"));
    }
}
