//! Line fitting and uncertainty propagation.
//!
//! Responsibilities:
//!
//! - closed-form OLS fit of mass vs. volume (`fitter`)
//! - uncertainty band around the fitted line (`band`)

pub mod band;
pub mod fitter;

pub use band::*;
pub use fitter::*;
