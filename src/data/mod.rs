//! Synthetic measurement generation.

pub mod sample;

pub use sample::*;
