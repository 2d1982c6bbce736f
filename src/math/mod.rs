//! Mathematical utilities: closed-form least-squares sums and parameter covariance.

pub mod ols;

pub use ols::*;
