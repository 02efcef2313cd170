// Topic model trait — one fit/describe interface over two structurally
// different clustering algorithms.
//
// Callers only ever see assignments and topic vocabularies; whether the
// labels came from embedding clustering or matrix decomposition is
// invisible past construction time. Selection happens once, by resource
// availability, never by runtime type inspection.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Reserved topic id for documents that fit no discovered cluster
/// (and for documents excluded from modeling input entirely).
/// Discovered topics use `1..=n_topics`.
pub const OUTLIER_TOPIC_ID: i32 = 0;

/// Result of fitting a topic model over the corpus.
#[derive(Debug, Clone)]
pub struct TopicAssignments {
    /// One topic label per input document, in input order
    pub labels: Vec<i32>,
    /// Per-document distribution over discovered topics (index 0 is
    /// topic 1), when the variant produces one
    pub probabilities: Option<Vec<Vec<f64>>>,
}

/// One row of the model's summary table.
#[derive(Debug, Clone, Serialize)]
pub struct TopicSummary {
    pub topic_id: i32,
    pub member_count: usize,
}

/// Polymorphic topic modeling capability.
#[async_trait]
pub trait TopicModel: Send + std::fmt::Debug {
    /// Cluster the given normalized documents and return a label per
    /// document. Must be called before `describe` or `info`.
    async fn fit(&mut self, documents: &[String]) -> Result<TopicAssignments>;

    /// The characteristic vocabulary of a topic, highest score first.
    /// Empty for unknown ids or before `fit`.
    fn describe(&self, topic_id: i32) -> Vec<(String, f64)>;

    /// Summary table of topic id → member count. Not every variant can
    /// produce one.
    fn info(&self) -> Option<Vec<TopicSummary>>;

    /// Short human-readable name for the report's mode line.
    fn name(&self) -> &'static str;
}
