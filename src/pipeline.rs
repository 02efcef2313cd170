// The analysis pipeline: extraction, normalization, statistics, topic
// discovery, policy scoring, and report synthesis, in that order.
//
// Per-document failures are recorded and skipped; the run only aborts
// when the whole corpus is unusable. Output directories are created
// after the corpus-survival check so a failed run leaves nothing behind.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::{Config, ModelerBackend};
use crate::corpus::CorpusStore;
use crate::extract::{PdfExtractor, SkipReason};
use crate::policy;
use crate::report::{self, artifacts, ReportInputs};
use crate::stats;
use crate::text::{TextCleaner, Tokenizer};
use crate::topics::{self, Topic, TopicModel, OUTLIER_TOPIC_ID};
use crate::viz;

/// What one completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub documents: usize,
    pub skipped: usize,
    pub topics: usize,
    pub report_path: PathBuf,
}

/// Run the full analysis.
pub async fn run(config: &Config) -> Result<RunSummary> {
    let files = list_pdf_files(&config.pdf_dir)?;
    info!(count = files.len(), dir = %config.pdf_dir.display(), "Found PDF files");

    let mut corpus = extract_corpus(config, &files);
    if corpus.is_empty() {
        anyhow::bail!(
            "No text could be extracted from any of the {} PDF files in {}",
            files.len(),
            config.pdf_dir.display()
        );
    }
    info!(
        documents = corpus.len(),
        skipped = corpus.skipped().len(),
        "Corpus assembled"
    );

    let statistics = stats::aggregate(corpus.documents(), config.top_terms)?;
    info!(
        total_words = statistics.total_words,
        unique_terms = statistics.unique_terms,
        "Statistics computed"
    );

    let (topic_list, model_name, decomposition_used) = model_topics(config, &mut corpus).await?;
    info!(topics = topic_list.len(), model = model_name, "Topic discovery finished");

    let areas = policy::relevance_scores(&corpus.joined_normalized_text());
    for area in &areas {
        info!(area = %area.name, score = area.score, "Policy area scored");
    }

    // The corpus survived; only now does anything touch the filesystem.
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            config.output_dir.display()
        )
    })?;

    viz::render_all(&config.output_dir.join("visualizations"), &corpus, &statistics)?;
    artifacts::write_all(&config.output_dir.join("data"), &corpus, &statistics)?;

    let rendered = report::render(&ReportInputs {
        stats: &statistics,
        topics: &topic_list,
        areas: &areas,
        skipped: corpus.skipped().len(),
        model_name,
        decomposition_used,
        significance_threshold: config.significance_threshold,
        generated: Local::now(),
    });
    let report_path = config.output_dir.join(report::REPORT_FILENAME);
    std::fs::write(&report_path, rendered)
        .with_context(|| format!("Failed to write {}", report_path.display()))?;

    print_summary(&corpus, &statistics, &topic_list, &report_path);

    Ok(RunSummary {
        documents: corpus.len(),
        skipped: corpus.skipped().len(),
        topics: topic_list.len(),
        report_path,
    })
}

/// Sorted listing of the PDF files to analyze.
fn list_pdf_files(pdf_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(pdf_dir)
        .with_context(|| format!("PDF directory not found: {}", pdf_dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No PDF files found in {}", pdf_dir.display());
    }
    Ok(files)
}

/// Extract, clean, and normalize every file into a corpus store.
/// Unreadable or underyielding documents are recorded as skips.
fn extract_corpus(config: &Config, files: &[PathBuf]) -> CorpusStore {
    let extractor = PdfExtractor::new(config.min_yield_chars);
    let cleaner = TextCleaner::new();
    let tokenizer = Tokenizer::new();
    let mut corpus = CorpusStore::new();

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("=> "),
    );

    for path in files {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        bar.set_message(filename.clone());

        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                warn!(file = %filename, error = %e, "Failed to read file");
                corpus.record_skip(filename, SkipReason::PrimaryFailed);
                bar.inc(1);
                continue;
            }
        };

        match extractor.extract(&data) {
            Ok(text) => {
                let cleaned = cleaner.clean(&text);
                let normalized = tokenizer.normalize(&cleaned);
                corpus.push(filename, cleaned, normalized);
            }
            Err(reason) => {
                warn!(file = %filename, reason = %reason, "Skipping document");
                corpus.record_skip(filename, reason);
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    corpus
}

/// Fit the configured topic model and write labels back into the corpus.
///
/// Documents shorter than the modeling-input floor are kept in the
/// corpus but labeled as outliers without being fed to the model. A fit
/// failure degrades the run to an all-outlier labeling instead of
/// aborting it.
async fn model_topics(
    config: &Config,
    corpus: &mut CorpusStore,
) -> Result<(Vec<Topic>, &'static str, bool)> {
    let (mut model, backend) = topics::build_model(config)?;
    let model_name = model.name();
    let decomposition_used = backend == ModelerBackend::Decomposition;

    let eligible: Vec<(usize, String)> = corpus
        .documents()
        .iter()
        .filter(|doc| doc.word_count >= config.min_model_tokens)
        .map(|doc| (doc.id, doc.normalized_text.clone()))
        .collect();
    let excluded: Vec<usize> = corpus
        .documents()
        .iter()
        .filter(|doc| doc.word_count < config.min_model_tokens)
        .map(|doc| doc.id)
        .collect();

    if !excluded.is_empty() {
        info!(
            excluded = excluded.len(),
            floor = config.min_model_tokens,
            "Documents below the modeling-input floor labeled as outliers"
        );
    }
    for &id in &excluded {
        corpus.assign_topic(id, OUTLIER_TOPIC_ID);
    }

    if eligible.is_empty() {
        warn!("No documents long enough for topic modeling");
        return Ok((Vec::new(), model_name, decomposition_used));
    }

    let texts: Vec<String> = eligible.iter().map(|(_, text)| text.clone()).collect();
    match model.fit(&texts).await {
        Ok(assignments) => {
            for ((id, _), &label) in eligible.iter().zip(assignments.labels.iter()) {
                corpus.assign_topic(*id, label);
            }
        }
        Err(e) => {
            warn!("Topic modeling failed, labeling all documents as outliers: {e:#}");
            for (id, _) in &eligible {
                corpus.assign_topic(*id, OUTLIER_TOPIC_ID);
            }
            return Ok((Vec::new(), model_name, decomposition_used));
        }
    }

    let topic_list = topics::collect_topics(model.as_ref(), corpus.documents());
    Ok((topic_list, model_name, decomposition_used))
}

fn print_summary(
    corpus: &CorpusStore,
    statistics: &stats::CorpusStatistics,
    topic_list: &[Topic],
    report_path: &Path,
) {
    println!("\n{}", "Analysis complete".green().bold());
    println!(
        "  {} documents analyzed, {} skipped",
        corpus.len(),
        corpus.skipped().len()
    );
    println!(
        "  {} total words, {} unique terms",
        statistics.total_words, statistics.unique_terms
    );
    println!("  {} topics discovered", topic_list.len());
    println!("\n  Report: {}", report_path.display().to_string().cyan());
}
