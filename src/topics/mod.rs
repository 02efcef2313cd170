// Topic discovery over the normalized corpus.
//
// Two interchangeable variants behind one trait:
// - embedding: local ONNX sentence embeddings + k-means clustering
// - decomposition: term-matrix factorization, no external files
//
// Selection is availability-driven: Auto picks the embedding variant
// when its model files are on disk and load cleanly, and falls back to
// the decomposition otherwise.

pub mod decomposition;
pub mod download;
pub mod embedding;
pub mod traits;

pub use decomposition::DecompositionModel;
pub use embedding::EmbeddingModel;
pub use traits::{TopicAssignments, TopicModel, TopicSummary, OUTLIER_TOPIC_ID};

use anyhow::Result;
use tracing::{info, warn};

use crate::config::{Config, ModelerBackend};
use crate::corpus::DocumentRecord;

/// One discovered topic, assembled for the report after fitting.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Topic {
    pub id: i32,
    /// Characteristic terms, highest score first
    pub top_terms: Vec<(String, f64)>,
    /// Corpus ids of the member documents, in extraction order
    pub member_ids: Vec<usize>,
    /// A few member filenames to anchor the topic in the report
    pub example_files: Vec<String>,
}

impl Topic {
    pub fn member_count(&self) -> usize {
        self.member_ids.len()
    }
}

/// How many example filenames each topic carries into the report.
const EXAMPLES_PER_TOPIC: usize = 3;

/// Construct the topic model the configuration asks for, along with the
/// backend that selection resolved to. The resolved backend is what the
/// report's mode line reflects; Auto never surfaces as a mode of its own.
pub fn build_model(config: &Config) -> Result<(Box<dyn TopicModel>, ModelerBackend)> {
    match config.modeler {
        ModelerBackend::Embedding => {
            config.require_embedding_model()?;
            let model = EmbeddingModel::load(&config.model_dir, config.n_topics)?;
            info!("Using embedding clustering (forced)");
            Ok((Box::new(model), ModelerBackend::Embedding))
        }
        ModelerBackend::Decomposition => {
            info!("Using term-matrix decomposition (forced)");
            Ok((
                Box::new(DecompositionModel::new(config.n_topics)),
                ModelerBackend::Decomposition,
            ))
        }
        ModelerBackend::Auto => {
            if download::model_files_present(&config.model_dir) {
                match EmbeddingModel::load(&config.model_dir, config.n_topics) {
                    Ok(model) => {
                        info!("Using embedding clustering");
                        return Ok((Box::new(model), ModelerBackend::Embedding));
                    }
                    Err(e) => {
                        warn!("Failed to load embedding model, falling back: {e:#}");
                    }
                }
            } else {
                info!(
                    "Embedding model files not found in {}, using term-matrix decomposition \
                     (run `landscape download-model` for embedding clustering)",
                    config.model_dir.display()
                );
            }
            Ok((
                Box::new(DecompositionModel::new(config.n_topics)),
                ModelerBackend::Decomposition,
            ))
        }
    }
}

/// Assemble per-topic report data from a fitted model and the labeled
/// corpus. The outlier bucket is excluded; topics come back in id order.
pub fn collect_topics(model: &dyn TopicModel, documents: &[DocumentRecord]) -> Vec<Topic> {
    let mut ids: Vec<i32> = documents
        .iter()
        .filter_map(|doc| doc.topic)
        .filter(|&id| id != OUTLIER_TOPIC_ID)
        .collect();
    ids.sort_unstable();
    ids.dedup();

    ids.into_iter()
        .map(|id| {
            let members: Vec<&DocumentRecord> = documents
                .iter()
                .filter(|doc| doc.topic == Some(id))
                .collect();
            Topic {
                id,
                top_terms: model.describe(id),
                member_ids: members.iter().map(|doc| doc.id).collect(),
                example_files: members
                    .iter()
                    .take(EXAMPLES_PER_TOPIC)
                    .map(|doc| doc.filename.clone())
                    .collect(),
            }
        })
        .collect()
}
