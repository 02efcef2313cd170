// Term-matrix decomposition topic model (variant B).
//
// The self-contained fallback: a bounded-vocabulary term-document count
// matrix factored into latent components by non-negative matrix
// factorization with seeded multiplicative updates. Needs no external
// resources and is fully deterministic, which is exactly what you want
// from the variant that runs when the embedding model is absent.

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;

use super::traits::{TopicAssignments, TopicModel, TopicSummary};

/// Vocabulary cap for the count matrix.
const MAX_FEATURES: usize = 1000;
/// A term must appear in at least this many documents...
const MIN_DOC_FREQUENCY: usize = 2;
/// ...and in at most this share of documents.
const MAX_DOC_FREQUENCY_RATIO: f64 = 0.8;

const NMF_SEED: u64 = 42;
const NMF_MAX_ITER: usize = 50;
const NMF_EPS: f64 = 1e-10;

/// How many characteristic terms to keep per component.
const TOPIC_VOCAB_SIZE: usize = 10;

/// Bounded-vocabulary term-document count matrix.
pub struct TermMatrix {
    /// Column order of the matrix
    pub vocabulary: Vec<String>,
    /// One row per document, one column per vocabulary term
    pub rows: Vec<Vec<f64>>,
}

/// Build the count matrix for a set of normalized documents.
///
/// Terms outside the document-frequency bounds are dropped; the
/// remaining vocabulary is capped at `MAX_FEATURES` by total count,
/// ties keeping first-encountered order.
pub fn count_matrix(documents: &[String]) -> Result<TermMatrix> {
    let n_docs = documents.len();

    // Document frequency and total count per term, insertion-ordered.
    let mut totals: IndexMap<&str, (usize, usize)> = IndexMap::new(); // (total, doc_freq)
    for doc in documents {
        let mut seen: IndexMap<&str, usize> = IndexMap::new();
        for term in doc.split_whitespace() {
            *seen.entry(term).or_insert(0) += 1;
        }
        for (term, count) in seen {
            let entry = totals.entry(term).or_insert((0, 0));
            entry.0 += count;
            entry.1 += 1;
        }
    }

    let max_df = (MAX_DOC_FREQUENCY_RATIO * n_docs as f64).floor() as usize;
    let mut candidates: Vec<(&str, usize)> = totals
        .into_iter()
        .filter(|&(_, (_, df))| df >= MIN_DOC_FREQUENCY && df <= max_df.max(1))
        .map(|(term, (total, _))| (term, total))
        .collect();

    candidates.sort_by(|a, b| b.1.cmp(&a.1)); // stable: ties keep insertion order
    candidates.truncate(MAX_FEATURES);

    if candidates.is_empty() {
        anyhow::bail!(
            "count matrix has an empty vocabulary — {} documents share too few terms",
            n_docs
        );
    }

    let vocabulary: Vec<String> = candidates.iter().map(|(t, _)| t.to_string()).collect();
    let column: IndexMap<&str, usize> = candidates
        .iter()
        .enumerate()
        .map(|(i, (t, _))| (*t, i))
        .collect();

    let rows: Vec<Vec<f64>> = documents
        .iter()
        .map(|doc| {
            let mut row = vec![0.0; vocabulary.len()];
            for term in doc.split_whitespace() {
                if let Some(&col) = column.get(term) {
                    row[col] += 1.0;
                }
            }
            row
        })
        .collect();

    Ok(TermMatrix { vocabulary, rows })
}

/// Argmax over component weights with ties broken by the lowest index.
fn dominant_component(weights: &[f64]) -> usize {
    let mut best = 0;
    let mut best_weight = f64::NEG_INFINITY;
    for (i, &w) in weights.iter().enumerate() {
        if w > best_weight {
            best_weight = w;
            best = i;
        }
    }
    best
}

/// Factor V (docs x terms) into W (docs x k) and H (k x terms) by
/// multiplicative updates from a seeded uniform initialization.
fn factorize(v: &[Vec<f64>], k: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let n = v.len();
    let m = v[0].len();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut w: Vec<Vec<f64>> = (0..n)
        .map(|_| (0..k).map(|_| rng.gen::<f64>() + NMF_EPS).collect())
        .collect();
    let mut h: Vec<Vec<f64>> = (0..k)
        .map(|_| (0..m).map(|_| rng.gen::<f64>() + NMF_EPS).collect())
        .collect();

    for _ in 0..NMF_MAX_ITER {
        // H update: H *= (Wt V) / (Wt W H)
        let mut wt_v = vec![vec![0.0; m]; k];
        let mut wt_w = vec![vec![0.0; k]; k];
        for i in 0..n {
            for c in 0..k {
                let wic = w[i][c];
                for j in 0..m {
                    wt_v[c][j] += wic * v[i][j];
                }
                for c2 in 0..k {
                    wt_w[c][c2] += wic * w[i][c2];
                }
            }
        }
        for c in 0..k {
            for j in 0..m {
                let mut denom = 0.0;
                for c2 in 0..k {
                    denom += wt_w[c][c2] * h[c2][j];
                }
                h[c][j] *= wt_v[c][j] / (denom + NMF_EPS);
            }
        }

        // W update: W *= (V Ht) / (W H Ht)
        let mut h_ht = vec![vec![0.0; k]; k];
        for c in 0..k {
            for c2 in 0..k {
                for j in 0..m {
                    h_ht[c][c2] += h[c][j] * h[c2][j];
                }
            }
        }
        for i in 0..n {
            for c in 0..k {
                let mut num = 0.0;
                for j in 0..m {
                    num += v[i][j] * h[c][j];
                }
                let mut denom = 0.0;
                for c2 in 0..k {
                    denom += w[i][c2] * h_ht[c2][c];
                }
                w[i][c] *= num / (denom + NMF_EPS);
            }
        }
    }

    (w, h)
}

/// The matrix-decomposition topic model.
#[derive(Debug)]
pub struct DecompositionModel {
    n_topics: usize,
    /// Populated by fit
    vocabulary: Vec<String>,
    components: Vec<Vec<f64>>,
}

impl DecompositionModel {
    pub fn new(n_topics: usize) -> Self {
        Self {
            n_topics,
            vocabulary: Vec::new(),
            components: Vec::new(),
        }
    }
}

#[async_trait]
impl TopicModel for DecompositionModel {
    async fn fit(&mut self, documents: &[String]) -> Result<TopicAssignments> {
        if documents.is_empty() {
            anyhow::bail!("cannot fit a topic model over zero documents");
        }

        let matrix = count_matrix(documents)?;
        let k = self.n_topics.min(documents.len()).max(1);

        info!(
            documents = documents.len(),
            vocabulary = matrix.vocabulary.len(),
            k,
            "Factoring term-document matrix"
        );

        let (weights, components) = factorize(&matrix.rows, k, NMF_SEED);

        // Component index c becomes topic id c + 1; the decomposition
        // never assigns the reserved outlier id.
        let labels: Vec<i32> = weights
            .iter()
            .map(|row| dominant_component(row) as i32 + 1)
            .collect();

        let probabilities: Vec<Vec<f64>> = weights
            .iter()
            .map(|row| {
                let sum: f64 = row.iter().sum();
                if sum > 0.0 {
                    row.iter().map(|w| w / sum).collect()
                } else {
                    vec![1.0 / k as f64; k]
                }
            })
            .collect();

        self.vocabulary = matrix.vocabulary;
        self.components = components;

        Ok(TopicAssignments {
            labels,
            probabilities: Some(probabilities),
        })
    }

    fn describe(&self, topic_id: i32) -> Vec<(String, f64)> {
        if topic_id < 1 || topic_id as usize > self.components.len() {
            return Vec::new();
        }
        let row = &self.components[topic_id as usize - 1];

        let mut scored: Vec<(String, f64)> = self
            .vocabulary
            .iter()
            .zip(row.iter())
            .filter(|&(_, &score)| score > NMF_EPS)
            .map(|(term, &score)| (term.clone(), score))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(TOPIC_VOCAB_SIZE);
        scored
    }

    /// The decomposition has no native summary table; member counts are
    /// derivable from the labels by the caller.
    fn info(&self) -> Option<Vec<TopicSummary>> {
        None
    }

    fn name(&self) -> &'static str {
        "term-matrix decomposition"
    }
}
