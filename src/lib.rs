//! `density-fit` library crate.
//!
//! The binary (`dfit`) is a thin wrapper around this library so that:
//!
//! - the fit, band and report logic is testable without spawning processes
//! - the CLI and the TUI share one pipeline

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
