//! Error types.
//!
//! - [`FitError`] is the library-level error raised by sample generation and
//!   fitting. Callers can match on it and retry with corrected inputs.
//! - [`AppError`] is the application boundary error: a message plus the process
//!   exit code used by the `dfit` binary.

use thiserror::Error;

/// Failures of the generation/fitting core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// Malformed generation parameters (too few points, inverted range, negative fractions).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A fit needs at least 3 points (N-2 degrees of freedom).
    #[error("Insufficient data: need at least 3 measurements to fit, got {n}.")]
    InsufficientData { n: usize },

    /// Zero spread in the independent variable.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
}

impl FitError {
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::InvalidArgument(_) => 2,
            FitError::InsufficientData { .. } => 3,
            FitError::DegenerateInput(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_errors_map_to_exit_codes() {
        let e: AppError = FitError::InvalidArgument("n must be >= 3".to_string()).into();
        assert_eq!(e.exit_code(), 2);
        assert_eq!(e.to_string(), "Invalid argument: n must be >= 3");

        let e: AppError = FitError::InsufficientData { n: 2 }.into();
        assert_eq!(e.exit_code(), 3);

        let e: AppError = FitError::DegenerateInput("all x identical".to_string()).into();
        assert_eq!(e.exit_code(), 4);
    }
}
