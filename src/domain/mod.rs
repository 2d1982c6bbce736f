//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - generation inputs (`ReferenceConstants`, `SampleSpec`)
//! - measurements and datasets (`Measurement`, `Dataset`)
//! - fit outputs (`FitResult`, `UncertaintyBand`, `FitFile`)

pub mod types;

pub use types::*;
