//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! The workflow is:
//! measurements (generated or CSV) -> OLS fit -> uncertainty band
//!
//! The CLI and the TUI then only deal with presentation and exports.

use crate::data::{generate_dataset, resolve_seed, sample_rng};
use crate::domain::{Dataset, FitResult, RunConfig, UncertaintyBand};
use crate::error::AppError;
use crate::fit::{fit_dataset, uncertainty_band};
use crate::io::load_measurements;
use crate::report::DataSource;

/// All computed outputs of a single `dfit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub dataset: Dataset,
    pub fit: FitResult,
    pub band: UncertaintyBand,
    pub source: DataSource,
}

/// Execute the full pipeline: obtain measurements, then fit them.
pub fn run_fit(config: &RunConfig) -> Result<RunOutput, AppError> {
    let (dataset, source) = match &config.input {
        Some(path) => {
            let ingested = load_measurements(path)?;
            let source = DataSource::Csv {
                path: path.display().to_string(),
                rows_skipped: ingested.row_errors.len(),
            };
            (ingested.dataset, source)
        }
        None => {
            let seed = resolve_seed(config.seed);
            let mut rng = sample_rng(seed);
            let dataset = generate_dataset(&mut rng, &config.reference, &config.sample)?;
            (dataset, DataSource::Generated { seed })
        }
    };

    run_fit_with_dataset(config, dataset, source)
}

/// Fit an already assembled dataset.
///
/// The TUI uses this after regenerating a sample with its own seed.
pub fn run_fit_with_dataset(
    config: &RunConfig,
    dataset: Dataset,
    source: DataSource,
) -> Result<RunOutput, AppError> {
    let fit = fit_dataset(&dataset, &config.reference)?;
    let band = uncertainty_band(&dataset, &fit)?;

    log::info!(
        "fitted {} points: a={:.6}±{:.6} b={:.4}±{:.4}",
        fit.n,
        fit.a,
        fit.sigma_a,
        fit.b,
        fit.sigma_b
    );

    Ok(RunOutput {
        dataset,
        fit,
        band,
        source,
    })
}
