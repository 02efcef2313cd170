// Corpus store — the single-owner collection of per-document records.
//
// Every pipeline stage after extraction reads (and the topic stage
// writes labels into) this store. Records live in a Vec arena indexed
// by their dense id; nothing else retains a copy of document text.

use serde::Serialize;

use crate::extract::SkipReason;

/// One successfully extracted document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    /// Dense id, assigned in extraction order
    pub id: usize,
    pub filename: String,
    /// Cleaned extracted text (post-cleaning, pre-tokenization)
    pub raw_text: String,
    /// Space-joined normalized token stream
    pub normalized_text: String,
    /// Normalized token count
    pub word_count: usize,
    /// Character count of the cleaned text
    pub char_count: usize,
    /// Topic label, unset until the modeling stage runs, then set once
    pub topic: Option<i32>,
}

/// A document dropped during extraction, with the recorded reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedDocument {
    pub filename: String,
    pub reason: SkipReason,
}

/// In-memory corpus for one pipeline run. Exclusively owned and mutated
/// by the pipeline driver.
#[derive(Debug, Default)]
pub struct CorpusStore {
    documents: Vec<DocumentRecord>,
    skipped: Vec<SkippedDocument>,
}

impl CorpusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document and return its id.
    pub fn push(&mut self, filename: String, raw_text: String, normalized_text: String) -> usize {
        let id = self.documents.len();
        let word_count = normalized_text.split_whitespace().count();
        let char_count = raw_text.chars().count();
        self.documents.push(DocumentRecord {
            id,
            filename,
            raw_text,
            normalized_text,
            word_count,
            char_count,
            topic: None,
        });
        id
    }

    /// Record a dropped document.
    pub fn record_skip(&mut self, filename: String, reason: SkipReason) {
        self.skipped.push(SkippedDocument { filename, reason });
    }

    /// Set a document's topic label. Labels are write-once; a second
    /// assignment to the same document is a pipeline bug.
    pub fn assign_topic(&mut self, id: usize, topic: i32) {
        let record = &mut self.documents[id];
        debug_assert!(record.topic.is_none(), "topic label assigned twice");
        record.topic = Some(topic);
    }

    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    pub fn skipped(&self) -> &[SkippedDocument] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Concatenated normalized text of the whole corpus, used for the
    /// policy-taxonomy keyword scan.
    pub fn joined_normalized_text(&self) -> String {
        let texts: Vec<&str> = self
            .documents
            .iter()
            .map(|d| d.normalized_text.as_str())
            .collect();
        texts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(docs: &[(&str, &str, &str)]) -> CorpusStore {
        let mut store = CorpusStore::new();
        for (name, raw, normalized) in docs {
            store.push(name.to_string(), raw.to_string(), normalized.to_string());
        }
        store
    }

    #[test]
    fn push_assigns_dense_ids_in_order() {
        let store = store_with(&[
            ("a.pdf", "raw a", "norm a"),
            ("b.pdf", "raw b", "norm b"),
        ]);
        let ids: Vec<usize> = store.documents().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn push_computes_counts() {
        let store = store_with(&[("a.pdf", "the raw text here", "raw text")]);
        let doc = &store.documents()[0];
        assert_eq!(doc.word_count, 2);
        assert_eq!(doc.char_count, 17);
    }

    #[test]
    fn topic_starts_unset_and_is_assignable() {
        let mut store = store_with(&[("a.pdf", "raw", "norm")]);
        assert!(store.documents()[0].topic.is_none());
        store.assign_topic(0, 3);
        assert_eq!(store.documents()[0].topic, Some(3));
    }

    #[test]
    fn skips_are_recorded_separately() {
        let mut store = store_with(&[("kept.pdf", "raw", "norm")]);
        store.record_skip("broken.pdf".to_string(), SkipReason::PrimaryFailed);
        assert_eq!(store.len(), 1);
        assert_eq!(store.skipped().len(), 1);
        assert_eq!(store.skipped()[0].filename, "broken.pdf");
    }

    #[test]
    fn joined_text_spans_all_documents() {
        let store = store_with(&[
            ("a.pdf", "x", "alpha beta"),
            ("b.pdf", "y", "gamma"),
        ]);
        assert_eq!(store.joined_normalized_text(), "alpha beta gamma");
    }
}
