// Report synthesis: the markdown assessment plus the machine-readable
// data files that back it.

pub mod artifacts;
pub mod markdown;

pub use markdown::{render, ReportInputs, REPORT_FILENAME};
