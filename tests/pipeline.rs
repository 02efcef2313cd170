// End-to-end failure-path tests for the analysis pipeline.
//
// Success paths need real PDF input and are covered at the module level;
// these tests pin down the abort behavior: a run that produces no corpus
// must leave no output directory behind.

use std::path::Path;

use landscape::config::{Config, ModelerBackend};
use landscape::pipeline;

fn test_config(pdf_dir: &Path, output_dir: &Path) -> Config {
    Config {
        pdf_dir: pdf_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        model_dir: pdf_dir.join("no-models-here"),
        modeler: ModelerBackend::Decomposition,
        n_topics: 4,
        min_yield_chars: 100,
        significance_threshold: 50,
        min_model_tokens: 25,
        top_terms: 20,
    }
}

#[tokio::test]
async fn missing_pdf_dir_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(&tmp.path().join("absent"), &tmp.path().join("out"));

    let result = pipeline::run(&config).await;
    assert!(result.is_err());
    assert!(!config.output_dir.exists());
}

#[tokio::test]
async fn empty_pdf_dir_fails_without_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf_dir = tmp.path().join("pdfs");
    std::fs::create_dir(&pdf_dir).unwrap();
    let config = test_config(&pdf_dir, &tmp.path().join("out"));

    let result = pipeline::run(&config).await;
    assert!(result.is_err());
    assert!(!config.output_dir.exists());
}

#[tokio::test]
async fn unextractable_pdfs_fail_without_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf_dir = tmp.path().join("pdfs");
    std::fs::create_dir(&pdf_dir).unwrap();
    std::fs::write(pdf_dir.join("garbage_one.pdf"), b"this is not a pdf").unwrap();
    std::fs::write(pdf_dir.join("garbage_two.pdf"), b"%PDF-1.4\n%%EOF\n").unwrap();
    let config = test_config(&pdf_dir, &tmp.path().join("out"));

    let result = pipeline::run(&config).await;
    let err = format!("{:#}", result.unwrap_err());
    assert!(err.contains("No text could be extracted"), "got: {err}");
    assert!(!config.output_dir.exists());
}

#[tokio::test]
async fn non_pdf_files_are_ignored_entirely() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf_dir = tmp.path().join("pdfs");
    std::fs::create_dir(&pdf_dir).unwrap();
    std::fs::write(pdf_dir.join("notes.txt"), b"plain text, not analyzed").unwrap();
    let config = test_config(&pdf_dir, &tmp.path().join("out"));

    // Directory holds no PDFs at all, so the listing itself fails
    let result = pipeline::run(&config).await;
    let err = format!("{:#}", result.unwrap_err());
    assert!(err.contains("No PDF files found"), "got: {err}");
}
