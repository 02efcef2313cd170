// Machine-readable data files written alongside the report.
//
// Everything lands under `<output>/data/`: full extracted texts and
// statistics as JSON, topic assignments as CSV.

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use tracing::info;

use crate::corpus::CorpusStore;
use crate::stats::CorpusStatistics;

/// Write all data files for one run.
pub fn write_all(data_dir: &Path, corpus: &CorpusStore, stats: &CorpusStatistics) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    write_extracted_texts(&data_dir.join("extracted_texts.json"), corpus)?;
    write_statistics(&data_dir.join("corpus_statistics.json"), stats)?;
    write_topic_assignments(&data_dir.join("topic_assignments.csv"), corpus)?;

    info!("Data files written to {}", data_dir.display());
    Ok(())
}

#[derive(serde::Serialize)]
struct TextEntry<'a> {
    raw_text: &'a str,
    normalized_text: &'a str,
}

/// filename -> {raw, normalized} text, in extraction order.
fn write_extracted_texts(path: &Path, corpus: &CorpusStore) -> Result<()> {
    let texts: IndexMap<&str, TextEntry> = corpus
        .documents()
        .iter()
        .map(|doc| {
            (
                doc.filename.as_str(),
                TextEntry {
                    raw_text: doc.raw_text.as_str(),
                    normalized_text: doc.normalized_text.as_str(),
                },
            )
        })
        .collect();
    let json = serde_json::to_string_pretty(&texts)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn write_statistics(path: &Path, stats: &CorpusStatistics) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// One row per document: filename, assigned topic, word count.
/// Unlabeled documents carry the outlier id.
fn write_topic_assignments(path: &Path, corpus: &CorpusStore) -> Result<()> {
    let mut out = String::from("filename,topic,word_count\n");
    for doc in corpus.documents() {
        let topic = doc.topic.unwrap_or(crate::topics::OUTLIER_TOPIC_ID);
        out.push_str(&format!(
            "{},{},{}\n",
            csv_field(&doc.filename),
            topic,
            doc.word_count
        ));
    }
    std::fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))
}

/// Quote a CSV field when it contains a comma, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
