// Corpus statistics — counts, distributions, and term-frequency rankings.

use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;

use crate::corpus::DocumentRecord;

/// Derived, immutable snapshot of corpus-wide figures. Recomputed
/// wholesale each run, never mutated incrementally.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusStatistics {
    pub total_documents: usize,
    pub total_words: usize,
    pub avg_words: f64,
    pub median_words: f64,
    pub min_words: usize,
    pub max_words: usize,
    pub unique_terms: usize,
    /// Top-K terms by corpus-wide frequency, highest first. Ties keep
    /// first-encountered order.
    pub top_terms: Vec<(String, usize)>,
}

/// Compute statistics over the corpus snapshot.
///
/// Pure function of the records; an empty corpus is a caller-level
/// error and should have been rejected before this stage.
pub fn aggregate(documents: &[DocumentRecord], top_k: usize) -> Result<CorpusStatistics> {
    if documents.is_empty() {
        anyhow::bail!("cannot aggregate statistics over an empty corpus");
    }

    let mut word_counts: Vec<usize> = documents.iter().map(|d| d.word_count).collect();
    let total_words: usize = word_counts.iter().sum();
    let avg_words = total_words as f64 / documents.len() as f64;

    word_counts.sort_unstable();
    let median_words = median_of_sorted(&word_counts);
    let min_words = word_counts[0];
    let max_words = word_counts[word_counts.len() - 1];

    // Term frequency over the normalized token streams. The insertion-
    // ordered map plus a stable sort gives the first-encountered tie-break.
    let mut term_counts: IndexMap<&str, usize> = IndexMap::new();
    for doc in documents {
        for token in doc.normalized_text.split_whitespace() {
            *term_counts.entry(token).or_insert(0) += 1;
        }
    }
    let unique_terms = term_counts.len();

    let mut ranked: Vec<(&str, usize)> = term_counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1)); // stable: ties keep insertion order
    let top_terms: Vec<(String, usize)> = ranked
        .into_iter()
        .take(top_k)
        .map(|(term, count)| (term.to_string(), count))
        .collect();

    Ok(CorpusStatistics {
        total_documents: documents.len(),
        total_words,
        avg_words,
        median_words,
        min_words,
        max_words,
        unique_terms,
        top_terms,
    })
}

fn median_of_sorted(sorted: &[usize]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: usize, normalized: &str) -> DocumentRecord {
        DocumentRecord {
            id,
            filename: format!("doc{id}.pdf"),
            raw_text: normalized.to_string(),
            normalized_text: normalized.to_string(),
            word_count: normalized.split_whitespace().count(),
            char_count: normalized.chars().count(),
            topic: None,
        }
    }

    #[test]
    fn empty_corpus_is_an_error() {
        assert!(aggregate(&[], 10).is_err());
    }

    #[test]
    fn counts_match_corpus_size() {
        let docs = vec![doc(0, "one two three"), doc(1, "four five")];
        let stats = aggregate(&docs, 10).unwrap();
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.total_words, 5);
        assert_eq!(stats.min_words, 2);
        assert_eq!(stats.max_words, 3);
    }

    #[test]
    fn min_avg_max_ordering_holds() {
        let docs = vec![
            doc(0, "a b c d e f"),
            doc(1, "a b"),
            doc(2, "a b c d"),
        ];
        let stats = aggregate(&docs, 10).unwrap();
        assert!(stats.min_words as f64 <= stats.avg_words);
        assert!(stats.avg_words <= stats.max_words as f64);
    }

    #[test]
    fn median_even_count_averages_middle_pair() {
        let docs = vec![doc(0, "a"), doc(1, "a b"), doc(2, "a b c"), doc(3, "a b c d")];
        let stats = aggregate(&docs, 10).unwrap();
        assert!((stats.median_words - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn median_odd_count_is_middle_value() {
        let docs = vec![doc(0, "a"), doc(1, "a b c d e"), doc(2, "a b")];
        let stats = aggregate(&docs, 10).unwrap();
        assert!((stats.median_words - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn top_terms_ranked_by_count() {
        let docs = vec![
            doc(0, "algorithm data model"),
            doc(1, "fairness bias ethical"),
            doc(2, "algorithm model learning"),
        ];
        let stats = aggregate(&docs, 2).unwrap();
        let terms: Vec<&str> = stats.top_terms.iter().map(|(t, _)| t.as_str()).collect();
        assert!(terms.contains(&"algorithm"));
        assert!(terms.contains(&"model"));
        for (term, count) in &stats.top_terms {
            assert_eq!(*count, 2, "term {term} should appear twice");
        }
    }

    #[test]
    fn ties_keep_first_encountered_order() {
        let docs = vec![doc(0, "zebra apple zebra apple mango")];
        let stats = aggregate(&docs, 3).unwrap();
        // zebra and apple tie at 2; zebra was seen first
        assert_eq!(stats.top_terms[0].0, "zebra");
        assert_eq!(stats.top_terms[1].0, "apple");
        assert_eq!(stats.top_terms[2], ("mango".to_string(), 1));
    }

    #[test]
    fn unique_terms_counts_distinct_tokens() {
        let docs = vec![doc(0, "alpha beta alpha"), doc(1, "beta gamma")];
        let stats = aggregate(&docs, 10).unwrap();
        assert_eq!(stats.unique_terms, 3);
    }
}
