use std::env;
use std::path::PathBuf;

use anyhow::Result;

/// Which topic modeling backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelerBackend {
    /// Embedding-based clustering if the model files are present,
    /// otherwise the decomposition fallback
    Auto,
    /// Local ONNX sentence embeddings + clustering — requires downloaded model files
    Embedding,
    /// Term-matrix decomposition — fully self-contained, no model files needed
    Decomposition,
}

/// Central configuration loaded from environment variables, with CLI
/// flags layered on top by main.rs.
///
/// The two unexplained constants from the original analysis workflow
/// (minimum extraction yield, policy significance threshold) are kept
/// configurable rather than given "better" defaults.
pub struct Config {
    /// Directory of PDF files to analyze
    pub pdf_dir: PathBuf,
    /// Directory where the report, data files, and charts are written
    pub output_dir: PathBuf,
    /// Directory containing the ONNX embedding model files
    pub model_dir: PathBuf,
    /// Which topic modeler to construct (default: Auto)
    pub modeler: ModelerBackend,
    /// Number of topics to discover
    pub n_topics: usize,
    /// Minimum stripped length of extracted text before the fallback
    /// strategy is tried / the document is dropped
    pub min_yield_chars: usize,
    /// A policy area appears in the report only when its keyword
    /// occurrence count exceeds this threshold
    pub significance_threshold: usize,
    /// Documents with fewer normalized tokens than this are kept for
    /// statistics but excluded from topic modeling input
    pub min_model_tokens: usize,
    /// How many ranked terms the statistics artifact carries
    pub top_terms: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every field has a default — a bare `landscape analyze` works as
    /// long as the PDF directory exists.
    pub fn load() -> Result<Self> {
        let modeler = match env::var("LANDSCAPE_MODELER").as_deref() {
            Ok("embedding") => ModelerBackend::Embedding,
            Ok("decomposition") => ModelerBackend::Decomposition,
            // "auto" or unset both mean availability-driven selection
            _ => ModelerBackend::Auto,
        };

        let model_dir = env::var("LANDSCAPE_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::topics::download::default_model_dir());

        Ok(Self {
            pdf_dir: env::var("LANDSCAPE_PDF_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("pdfs")),
            output_dir: env::var("LANDSCAPE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("landscape_output")),
            model_dir,
            modeler,
            n_topics: parse_env("LANDSCAPE_N_TOPICS", 8)?,
            min_yield_chars: parse_env("LANDSCAPE_MIN_YIELD_CHARS", 100)?,
            significance_threshold: parse_env("LANDSCAPE_SIGNIFICANCE_THRESHOLD", 50)?,
            min_model_tokens: parse_env("LANDSCAPE_MIN_MODEL_TOKENS", 25)?,
            top_terms: parse_env("LANDSCAPE_TOP_TERMS", 20)?,
        })
    }

    /// Check that the embedding backend has its model files.
    /// Call this before constructing the modeler when the user forced
    /// `--embedding`; Auto mode falls back silently instead.
    pub fn require_embedding_model(&self) -> Result<()> {
        if !crate::topics::download::model_files_present(&self.model_dir) {
            anyhow::bail!(
                "Embedding model files not found in {}\n\
                 Run `landscape download-model` to download them,\n\
                 or drop --embedding to use the decomposition fallback.",
                self.model_dir.display()
            );
        }
        Ok(())
    }
}

fn parse_env(key: &str, default: usize) -> Result<usize> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("{key} must be a non-negative integer, got {raw:?}")),
        Err(_) => Ok(default),
    }
}
