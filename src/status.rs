// System status display — input folder, model availability, last run.

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::config::Config;
use crate::report::REPORT_FILENAME;
use crate::topics::download;

/// Display system status to the terminal.
pub fn show(config: &Config) -> Result<()> {
    // Input folder
    if config.pdf_dir.exists() {
        let count = std::fs::read_dir(&config.pdf_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
            })
            .count();
        println!("PDF folder: {} ({} files)", config.pdf_dir.display(), count);
    } else {
        println!("PDF folder: {} (not found)", config.pdf_dir.display());
        println!("  Create it and drop the PDFs to analyze inside");
    }

    // Embedding model
    if download::model_files_present(&config.model_dir) {
        println!("Embedding model: downloaded ({})", config.model_dir.display());
    } else {
        println!("Embedding model: not downloaded");
        println!("  Run `landscape download-model` for embedding-based clustering");
        println!("  (analysis works without it, via term-matrix decomposition)");
    }

    // Last report
    let report_path = config.output_dir.join(REPORT_FILENAME);
    match std::fs::metadata(&report_path) {
        Ok(meta) => {
            let modified: Option<DateTime<Local>> = meta.modified().ok().map(DateTime::from);
            match modified {
                Some(time) => println!(
                    "Last report: {} (generated {})",
                    report_path.display(),
                    time.format("%Y-%m-%d %H:%M:%S")
                ),
                None => println!("Last report: {}", report_path.display()),
            }
            for sub in ["data", "visualizations"] {
                let dir = config.output_dir.join(sub);
                if dir.exists() {
                    println!("  {}/ present", dir.display());
                }
            }
        }
        Err(_) => {
            println!("Last report: none");
            println!("  Run `landscape analyze` to generate one");
        }
    }

    Ok(())
}
