// Two-tier PDF text extraction.
//
// The primary strategy (pdf-extract) produces better text but can panic
// on malformed input rather than returning errors, so it runs behind a
// catch_unwind boundary. The fallback (lopdf page-by-page extraction)
// is cruder but survives documents the primary chokes on. Either tier
// can also silently return empty or near-empty text without erroring,
// which is why yield is checked in addition to success.

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::debug;

/// Why a document was dropped from the corpus.
///
/// These are per-document, recoverable outcomes — the batch continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The primary strategy raised and the fallback produced nothing either
    PrimaryFailed,
    /// The primary strategy underyielded and the fallback then raised
    SecondaryFailed,
    /// Text came out of at least one tier, but the best yield was below
    /// the minimum-yield threshold
    BelowMinimumYield,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::PrimaryFailed => "primary extraction failed",
            SkipReason::SecondaryFailed => "fallback extraction failed",
            SkipReason::BelowMinimumYield => "below minimum yield",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracts plain text from PDF byte blobs.
pub struct PdfExtractor {
    /// Stripped-text length below which an extraction attempt is treated
    /// as underyielding
    min_yield_chars: usize,
}

impl PdfExtractor {
    pub fn new(min_yield_chars: usize) -> Self {
        Self { min_yield_chars }
    }

    /// Extract text from a raw document blob.
    ///
    /// Tries the primary strategy first; falls back to the secondary on
    /// error or insufficient yield. A `SkipReason` is a drop decision,
    /// not an abort — callers record it and move on.
    pub fn extract(&self, data: &[u8]) -> Result<String, SkipReason> {
        let primary = extract_primary(data);
        if primary.is_none() {
            debug!("primary extraction raised, trying fallback");
        }
        select(primary, || extract_secondary(data), self.min_yield_chars)
    }
}

/// Resolve the two-tier fallback ladder into a final outcome.
///
/// The secondary strategy is only invoked when the primary raised or
/// underyielded. Kept as a free function over attempt outcomes so the
/// reason mapping is testable without real PDF bytes.
fn select<F>(
    primary: Option<String>,
    secondary: F,
    min_yield_chars: usize,
) -> Result<String, SkipReason>
where
    F: FnOnce() -> Option<String>,
{
    let yield_of = |text: &str| text.trim().chars().count();

    let primary_raised = primary.is_none();
    let primary_yield = primary.as_deref().map(yield_of).unwrap_or(0);
    if let Some(text) = primary {
        if primary_yield >= min_yield_chars {
            return Ok(text);
        }
    }

    match secondary() {
        Some(text) if yield_of(&text) >= min_yield_chars => Ok(text),
        Some(text) => {
            debug!(
                primary_yield,
                secondary_yield = yield_of(&text),
                "both extraction tiers underyielded"
            );
            Err(SkipReason::BelowMinimumYield)
        }
        None if primary_raised => Err(SkipReason::PrimaryFailed),
        None => {
            debug!(primary_yield, "primary underyielded and fallback raised");
            Err(SkipReason::SecondaryFailed)
        }
    }
}

/// Primary tier: pdf-extract.
///
/// The crate panics on some malformed documents, so the call is wrapped
/// in catch_unwind and a panic is folded into the same "raised" outcome
/// as an error return.
fn extract_primary(data: &[u8]) -> Option<String> {
    let owned = data.to_vec(); // owned copy for the unwind boundary
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(&owned)
    }));
    match result {
        Ok(Ok(text)) => Some(text),
        Ok(Err(e)) => {
            debug!(error = %e, "pdf-extract returned an error");
            None
        }
        Err(_) => {
            debug!("pdf-extract panicked on malformed input");
            None
        }
    }
}

/// Secondary tier: lopdf page-by-page extraction.
fn extract_secondary(data: &[u8]) -> Option<String> {
    let document = match lopdf::Document::load_mem(data) {
        Ok(doc) => doc,
        Err(e) => {
            debug!(error = %e, "lopdf failed to open document");
            return None;
        }
    };

    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    if pages.is_empty() {
        return None;
    }

    match document.extract_text(&pages) {
        Ok(text) => Some(text),
        Err(e) => {
            debug!(error = %e, "lopdf failed to extract text");
            None
        }
    }
}
