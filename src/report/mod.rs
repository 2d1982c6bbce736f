//! Reporting: terminal summaries and the formatted export table.

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;
