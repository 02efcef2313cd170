// Text extraction — two-tier PDF extraction with fallback.

pub mod pdf;

pub use pdf::{PdfExtractor, SkipReason};
