// Embedding-based topic discovery using all-MiniLM-L6-v2.
//
// Each document's normalized text is embedded into a 384-dimensional
// vector via a local ONNX sentence transformer (mean pooling over token
// embeddings, matching the model's training), then the vectors are
// clustered with seeded k-means. Documents whose vector sits too far
// from every centroid land in the reserved outlier bucket.
//
// The model runs locally — no API calls, no rate limits. CPU-bound
// inference is offloaded to spawn_blocking.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use rand::seq::index::sample;
use rand::{rngs::StdRng, SeedableRng};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::traits::{TopicAssignments, TopicModel, TopicSummary, OUTLIER_TOPIC_ID};

/// Embedding dimension for all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Token cap per document; MiniLM was trained on short sequences and
/// the lead of an academic document carries its topical signal.
const MAX_TOKENS: usize = 256;

/// A document is an outlier when its cosine similarity to the nearest
/// centroid falls below this floor.
const OUTLIER_SIMILARITY_FLOOR: f64 = 0.25;

/// Fixed seed for centroid initialization, so repeated runs over the
/// same corpus produce the same clustering.
const KMEANS_SEED: u64 = 42;
const KMEANS_MAX_ITER: usize = 50;

/// How many characteristic terms to keep per topic.
const TOPIC_VOCAB_SIZE: usize = 10;

/// Sentence embedder backed by a local ONNX model.
///
/// Session behind Arc<Mutex> for the spawn_blocking boundary, tokenizer
/// behind Arc for shared ownership.
#[derive(Debug)]
pub struct DocumentEmbedder {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl DocumentEmbedder {
    /// Load the embedding model and tokenizer from the given directory.
    ///
    /// Expects `model.onnx` and `tokenizer.json`; run
    /// `landscape download-model` to fetch them.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() || !tokenizer_path.exists() {
            anyhow::bail!(
                "Embedding model files not found in {}\nRun `landscape download-model` to download them.",
                model_dir.display()
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| {
                format!("Failed to load embedding model from {}", model_path.display())
            })?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load embedding tokenizer: {e}"))?;

        // Documents are far longer than the sequences this model was
        // trained on; truncate instead of feeding arbitrary lengths.
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {e}"))?;

        debug!("Loaded embedding model from {}", model_dir.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }

    /// Embed a batch of documents into 384-dimensional vectors.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || embed_sync(&session, &tokenizer, &texts))
            .await
            .context("spawn_blocking panicked")?
    }
}

/// Synchronous embedding: tokenization, inference, mean pooling.
fn embed_sync(
    session: &Arc<Mutex<Session>>,
    tokenizer: &Arc<Tokenizer>,
    texts: &[String],
) -> Result<Vec<Vec<f64>>> {
    let encodings: Vec<_> = texts
        .iter()
        .map(|t| {
            tokenizer
                .encode(t.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {e}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let batch_size = encodings.len();
    let max_len = encodings
        .iter()
        .map(|e| e.get_ids().len())
        .max()
        .unwrap_or(0);

    if max_len == 0 {
        return Ok(vec![vec![0.0; EMBEDDING_DIM]; batch_size]);
    }

    // Padded BERT inputs: token ids, attention mask (1 = real token),
    // token type ids (all zeros for single-sequence input).
    let mut input_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
    let mut attention_mask_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
    let mut token_type_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);

    for enc in &encodings {
        let ids = enc.get_ids();
        let mask = enc.get_attention_mask();
        let seq_len = ids.len();

        input_ids_flat.extend(ids.iter().map(|&id| id as i64));
        attention_mask_flat.extend(mask.iter().map(|&m| m as i64));
        token_type_ids_flat.extend(std::iter::repeat_n(0i64, seq_len));

        let pad_len = max_len - seq_len;
        input_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
        attention_mask_flat.extend(std::iter::repeat_n(0i64, pad_len));
        token_type_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
    }

    let shape = [batch_size as i64, max_len as i64];

    let input_ids_tensor =
        Tensor::from_array((shape, input_ids_flat)).context("Failed to create input_ids tensor")?;
    let attention_mask_tensor = Tensor::from_array((shape, attention_mask_flat.clone()))
        .context("Failed to create attention_mask tensor")?;
    let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids_flat))
        .context("Failed to create token_type_ids tensor")?;

    // last_hidden_state: [batch, seq_len, 384]
    let hidden_states = {
        let mut session = session
            .lock()
            .map_err(|e| anyhow::anyhow!("Session lock poisoned: {e}"))?;

        let outputs = session
            .run(ort::inputs! {
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor
            })
            .context("Embedding ONNX inference failed")?;

        let (_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .context("Failed to extract embedding output tensor")?;

        data.to_vec()
    };

    // Mean pooling weighted by the attention mask.
    let mut embeddings = Vec::with_capacity(batch_size);
    for i in 0..batch_size {
        let mut sum = vec![0.0_f64; EMBEDDING_DIM];
        let mut mask_sum = 0.0_f64;

        for j in 0..max_len {
            let mask_val = attention_mask_flat[i * max_len + j] as f64;
            if mask_val > 0.0 {
                mask_sum += mask_val;
                let offset = (i * max_len + j) * EMBEDDING_DIM;
                for k in 0..EMBEDDING_DIM {
                    sum[k] += hidden_states[offset + k] as f64 * mask_val;
                }
            }
        }

        if mask_sum > 0.0 {
            for val in &mut sum {
                *val /= mask_sum;
            }
        }
        embeddings.push(sum);
    }

    debug!(batch_size, dim = EMBEDDING_DIM, "Computed document embeddings");
    Ok(embeddings)
}

/// Cosine similarity between two vectors, clamped to [0, 1].
fn cosine(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    let denom = mag_a * mag_b;
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(0.0, 1.0)
    }
}

/// Result of a k-means run.
struct KMeansFit {
    /// Cluster index (0-based) per input vector
    assignments: Vec<usize>,
    centroids: Vec<Vec<f64>>,
}

/// Plain k-means with seeded initialization.
///
/// Centroids start at `k` distinct input vectors chosen by the seeded
/// RNG; assignment uses squared euclidean distance; iteration stops on
/// a stable assignment or the iteration cap. A cluster that loses all
/// members keeps its previous centroid.
fn kmeans(vectors: &[Vec<f64>], k: usize, max_iter: usize, seed: u64) -> KMeansFit {
    let n = vectors.len();
    let k = k.min(n).max(1);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids: Vec<Vec<f64>> = sample(&mut rng, n, k)
        .into_iter()
        .map(|i| vectors[i].clone())
        .collect();

    let mut assignments = vec![0usize; n];

    for _ in 0..max_iter {
        // Assignment step
        let mut changed = false;
        for (i, vector) in vectors.iter().enumerate() {
            let nearest = nearest_centroid(vector, &centroids);
            if assignments[i] != nearest {
                assignments[i] = nearest;
                changed = true;
            }
        }

        // Update step
        let mut sums = vec![vec![0.0_f64; centroids[0].len()]; k];
        let mut counts = vec![0usize; k];
        for (i, vector) in vectors.iter().enumerate() {
            counts[assignments[i]] += 1;
            for (d, &val) in vector.iter().enumerate() {
                sums[assignments[i]][d] += val;
            }
        }
        for c in 0..k {
            if counts[c] > 0 {
                for d in 0..sums[c].len() {
                    centroids[c][d] = sums[c][d] / counts[c] as f64;
                }
            }
        }

        if !changed {
            break;
        }
    }

    KMeansFit {
        assignments,
        centroids,
    }
}

fn nearest_centroid(vector: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let dist: f64 = vector
            .iter()
            .zip(centroid.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        if dist < best_dist {
            best_dist = dist;
            best = c;
        }
    }
    best
}

/// Characteristic vocabulary for one cluster: term frequency within the
/// cluster's members, weighted by inverse document frequency across the
/// whole input. Terms present in every document score zero and drop out.
fn cluster_vocabulary(
    documents: &[String],
    member_indices: &[usize],
    top_n: usize,
) -> Vec<(String, f64)> {
    let n_docs = documents.len();

    let mut doc_frequency: HashMap<&str, usize> = HashMap::new();
    for doc in documents {
        let distinct: HashSet<&str> = doc.split_whitespace().collect();
        for term in distinct {
            *doc_frequency.entry(term).or_insert(0) += 1;
        }
    }

    let mut term_frequency: indexmap::IndexMap<&str, usize> = indexmap::IndexMap::new();
    for &idx in member_indices {
        for term in documents[idx].split_whitespace() {
            *term_frequency.entry(term).or_insert(0) += 1;
        }
    }

    let mut scored: Vec<(String, f64)> = term_frequency
        .into_iter()
        .filter_map(|(term, tf)| {
            let df = doc_frequency.get(term).copied().unwrap_or(1);
            let idf = (n_docs as f64 / df as f64).ln();
            let score = tf as f64 * idf;
            (score > 0.0).then(|| (term.to_string(), score))
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_n);
    scored
}

/// Softmax over centroid similarities — the per-document distribution
/// across discovered topics.
fn similarity_distribution(similarities: &[f64]) -> Vec<f64> {
    let max = similarities.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = similarities.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// The embedding-clustering topic model (variant A).
#[derive(Debug)]
pub struct EmbeddingModel {
    embedder: DocumentEmbedder,
    n_topics: usize,
    /// Populated by fit
    vocabularies: BTreeMap<i32, Vec<(String, f64)>>,
    summaries: Vec<TopicSummary>,
    fitted: bool,
}

impl EmbeddingModel {
    pub fn load(model_dir: &Path, n_topics: usize) -> Result<Self> {
        let embedder = DocumentEmbedder::load(model_dir)?;
        Ok(Self {
            embedder,
            n_topics,
            vocabularies: BTreeMap::new(),
            summaries: Vec::new(),
            fitted: false,
        })
    }
}

#[async_trait]
impl TopicModel for EmbeddingModel {
    async fn fit(&mut self, documents: &[String]) -> Result<TopicAssignments> {
        if documents.is_empty() {
            anyhow::bail!("cannot fit a topic model over zero documents");
        }

        let embeddings = self.embedder.embed_batch(documents).await?;
        let k = self.n_topics.min(documents.len());

        info!(documents = documents.len(), k, "Clustering document embeddings");
        let fit = kmeans(&embeddings, k, KMEANS_MAX_ITER, KMEANS_SEED);

        let mut labels = Vec::with_capacity(documents.len());
        let mut probabilities = Vec::with_capacity(documents.len());
        let mut members: BTreeMap<i32, Vec<usize>> = BTreeMap::new();

        for (i, embedding) in embeddings.iter().enumerate() {
            let sims: Vec<f64> = fit.centroids.iter().map(|c| cosine(embedding, c)).collect();
            let assigned = fit.assignments[i];

            let label = if sims[assigned] < OUTLIER_SIMILARITY_FLOOR {
                OUTLIER_TOPIC_ID
            } else {
                assigned as i32 + 1
            };
            labels.push(label);
            probabilities.push(similarity_distribution(&sims));
            members.entry(label).or_default().push(i);
        }

        self.vocabularies.clear();
        self.summaries.clear();
        for (&label, member_indices) in &members {
            self.summaries.push(TopicSummary {
                topic_id: label,
                member_count: member_indices.len(),
            });
            if label != OUTLIER_TOPIC_ID {
                self.vocabularies.insert(
                    label,
                    cluster_vocabulary(documents, member_indices, TOPIC_VOCAB_SIZE),
                );
            }
        }
        self.fitted = true;

        Ok(TopicAssignments {
            labels,
            probabilities: Some(probabilities),
        })
    }

    fn describe(&self, topic_id: i32) -> Vec<(String, f64)> {
        self.vocabularies.get(&topic_id).cloned().unwrap_or_default()
    }

    fn info(&self) -> Option<Vec<TopicSummary>> {
        self.fitted.then(|| self.summaries.clone())
    }

    fn name(&self) -> &'static str {
        "embedding clustering (all-MiniLM-L6-v2)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identical_vectors() {
        let a = vec![1.0, 2.0, 3.0];
        assert!((cosine(&a, &a) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine(&a, &b).abs() < 1e-10);
    }

    #[test]
    fn cosine_zero_vector() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 2.0];
        assert!(cosine(&a, &b).abs() < f64::EPSILON);
    }

    #[test]
    fn cosine_mismatched_dimensions() {
        assert!(cosine(&[1.0, 2.0], &[1.0, 2.0, 3.0]).abs() < f64::EPSILON);
    }

    #[test]
    fn kmeans_separates_obvious_clusters() {
        let vectors = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
            vec![10.0, 10.1],
        ];
        let fit = kmeans(&vectors, 2, 50, 42);
        assert_eq!(fit.assignments[0], fit.assignments[1]);
        assert_eq!(fit.assignments[1], fit.assignments[2]);
        assert_eq!(fit.assignments[3], fit.assignments[4]);
        assert_eq!(fit.assignments[4], fit.assignments[5]);
        assert_ne!(fit.assignments[0], fit.assignments[3]);
    }

    #[test]
    fn kmeans_is_deterministic_under_fixed_seed() {
        let vectors: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![(i % 5) as f64, (i / 5) as f64])
            .collect();
        let a = kmeans(&vectors, 3, 50, 42);
        let b = kmeans(&vectors, 3, 50, 42);
        assert_eq!(a.assignments, b.assignments);
    }

    #[test]
    fn kmeans_clamps_k_to_input_size() {
        let vectors = vec![vec![1.0], vec![2.0]];
        let fit = kmeans(&vectors, 8, 50, 42);
        assert_eq!(fit.centroids.len(), 2);
        assert!(fit.assignments.iter().all(|&a| a < 2));
    }

    #[test]
    fn distribution_sums_to_one() {
        let dist = similarity_distribution(&[0.9, 0.3, 0.1]);
        let sum: f64 = dist.iter().sum();
        assert!((sum - 1.0).abs() < 1e-10);
        // highest similarity gets the largest share
        assert!(dist[0] > dist[1] && dist[1] > dist[2]);
    }

    #[test]
    fn cluster_vocabulary_favors_distinctive_terms() {
        let documents = vec![
            "robot safety robot".to_string(),
            "robot safety hazard".to_string(),
            "poetry meter rhyme".to_string(),
            "poetry meter verse".to_string(),
        ];
        let vocab = cluster_vocabulary(&documents, &[0, 1], 5);
        let terms: Vec<&str> = vocab.iter().map(|(t, _)| t.as_str()).collect();
        assert!(terms.contains(&"robot"));
        assert!(terms.contains(&"safety"));
        assert!(!terms.contains(&"poetry"));
    }

    #[test]
    fn cluster_vocabulary_drops_universal_terms() {
        let documents = vec![
            "shared alpha".to_string(),
            "shared beta".to_string(),
        ];
        let vocab = cluster_vocabulary(&documents, &[0], 5);
        let terms: Vec<&str> = vocab.iter().map(|(t, _)| t.as_str()).collect();
        // "shared" appears in every document — zero idf, excluded
        assert!(!terms.contains(&"shared"));
        assert!(terms.contains(&"alpha"));
    }
}
