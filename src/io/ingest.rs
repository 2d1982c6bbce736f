//! CSV ingest of real (or previously exported) measurements.
//!
//! Accepted columns (case-insensitive, surrounding whitespace ignored):
//!
//! | field | header names |
//! | - | - |
//! | volume | `volume`, `v`, `x` |
//! | mass | `mass`, `m`, `y` |
//! | volume uncertainty | `sigma_volume`, `sigma_v`, `sigma_x`, `dv` |
//! | mass uncertainty | `sigma_mass`, `sigma_m`, `sigma_y`, `dm` |
//!
//! Volume and mass are required; missing uncertainty columns read as zero.
//! Bad rows are skipped and reported rather than failing the whole file.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Dataset, Measurement};
use crate::error::AppError;

const VOLUME_NAMES: &[&str] = &["volume", "v", "x"];
const MASS_NAMES: &[&str] = &["mass", "m", "y"];
const SIGMA_VOLUME_NAMES: &[&str] = &["sigma_volume", "sigma_v", "sigma_x", "dv"];
const SIGMA_MASS_NAMES: &[&str] = &["sigma_mass", "sigma_m", "sigma_y", "dm"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number in the file (the header is line 1).
    pub line: usize,
    pub message: String,
}

/// Ingest output: the usable measurements plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub dataset: Dataset,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    volume: usize,
    mass: usize,
    sigma_volume: Option<usize>,
    sigma_mass: Option<usize>,
}

/// Load measurements from a CSV file.
pub fn load_measurements(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let ingested = read_measurements(file)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;

    for err in &ingested.row_errors {
        log::warn!(
            "{}:{}: skipped row: {}",
            path.display(),
            err.line,
            err.message
        );
    }
    log::debug!(
        "loaded {} of {} rows from {}",
        ingested.dataset.len(),
        ingested.rows_read,
        path.display()
    );
    Ok(ingested)
}

/// Read measurements from any CSV source.
pub fn read_measurements<R: Read>(source: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let columns = resolve_columns(&build_header_map(&headers))?;

    let mut measurements = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0;

    for (idx, record) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: e.to_string(),
                });
                continue;
            }
        };
        match parse_row(&record, &columns) {
            Ok(m) => measurements.push(m),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if measurements.is_empty() {
        return Err(AppError::new(
            2,
            format!(
                "No usable measurements ({rows_read} rows read, {} rejected).",
                row_errors.len()
            ),
        ));
    }

    Ok(IngestedData {
        dataset: Dataset::new(measurements),
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
        .collect()
}

fn find_column(map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| map.get(*n).copied())
}

fn resolve_columns(map: &HashMap<String, usize>) -> Result<Columns, AppError> {
    let volume = find_column(map, VOLUME_NAMES)
        .ok_or_else(|| AppError::new(2, "CSV is missing a volume column (volume, v or x)."))?;
    let mass = find_column(map, MASS_NAMES)
        .ok_or_else(|| AppError::new(2, "CSV is missing a mass column (mass, m or y)."))?;
    Ok(Columns {
        volume,
        mass,
        sigma_volume: find_column(map, SIGMA_VOLUME_NAMES),
        sigma_mass: find_column(map, SIGMA_MASS_NAMES),
    })
}

fn parse_row(record: &StringRecord, columns: &Columns) -> Result<Measurement, String> {
    let x = parse_field(record, columns.volume, "volume")?;
    let y = parse_field(record, columns.mass, "mass")?;
    let sigma_x = match columns.sigma_volume {
        Some(i) => parse_sigma(record, i, "sigma_volume")?,
        None => 0.0,
    };
    let sigma_y = match columns.sigma_mass {
        Some(i) => parse_sigma(record, i, "sigma_mass")?,
        None => 0.0,
    };
    Ok(Measurement::new(x, y, sigma_x, sigma_y))
}

fn parse_field(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing {name}"))?;
    let value: f64 = raw.parse().map_err(|_| format!("invalid {name} '{raw}'"))?;
    if !value.is_finite() {
        return Err(format!("non-finite {name} '{raw}'"));
    }
    Ok(value)
}

/// Empty uncertainty cells read as zero.
fn parse_sigma(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    match record.get(idx) {
        None | Some("") => Ok(0.0),
        Some(_) => {
            let value = parse_field(record, idx, name)?;
            if value < 0.0 {
                return Err(format!("negative {name} {value}"));
            }
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_canonical_columns() {
        let csv = concat!(
            "volume,sigma_volume,mass,sigma_mass\n",
            "110,11,410.5,10.2625\n",
            "200,20,497.1,12.4275\n",
        );
        let data = read_measurements(csv.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 2);
        assert!(data.row_errors.is_empty());
        assert_eq!(
            data.dataset.measurements()[0],
            Measurement::new(110.0, 410.5, 11.0, 10.2625)
        );
        assert_eq!(data.dataset.measurements()[1].sigma_y, 12.4275);
    }

    #[test]
    fn aliases_and_missing_sigmas() {
        let csv = " X , Y ,extra\n1, 2 ,a\n3,4,b\n";
        let data = read_measurements(csv.as_bytes()).unwrap();
        assert_eq!(data.dataset.len(), 2);
        assert_eq!(
            data.dataset.measurements()[1],
            Measurement::new(3.0, 4.0, 0.0, 0.0)
        );
    }

    #[test]
    fn skips_bad_rows() {
        let csv = "volume,mass,sigma_mass\n1,2,0.1\nabc,3,0.1\n2,,0.1\n3,4,-1\n4,inf,0\n5,6,\n";
        let data = read_measurements(csv.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 6);
        assert_eq!(data.dataset.len(), 2);
        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6]);
        assert!(data.row_errors[0].message.contains("invalid volume"));
        assert!(data.row_errors[1].message.contains("missing mass"));
        assert!(data.row_errors[2].message.contains("negative sigma_mass"));
        assert!(data.row_errors[3].message.contains("non-finite mass"));
        assert_eq!(data.dataset.measurements()[1].sigma_y, 0.0);
    }

    #[test]
    fn missing_required_column() {
        let err = read_measurements("volume,weight\n1,2\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("mass column"));
    }

    #[test]
    fn no_usable_rows() {
        let err = read_measurements("x,y\nfoo,bar\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("No usable measurements"));
    }
}
