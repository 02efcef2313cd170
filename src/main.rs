use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use landscape::config::{Config, ModelerBackend};

/// Landscape: literature landscape analysis for PDF collections.
///
/// Extracts text from a folder of research PDFs, discovers the topics
/// they cover, scores their policy relevance, and writes a markdown
/// assessment report with charts and data files.
#[derive(Parser)]
#[command(name = "landscape", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis over a folder of PDFs
    Analyze {
        /// Folder of PDF files to analyze (default: pdfs/)
        #[arg(long)]
        pdf_dir: Option<PathBuf>,

        /// Where to write the report, data files, and charts
        /// (default: landscape_output/)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Number of topics to discover (default: 8)
        #[arg(long)]
        n_topics: Option<usize>,

        /// Force embedding-based clustering (requires downloaded model)
        #[arg(long, conflicts_with = "decomposition")]
        embedding: bool,

        /// Force the self-contained term-matrix decomposition
        #[arg(long)]
        decomposition: bool,
    },

    /// Download the sentence embedding model (~90 MB)
    DownloadModel,

    /// Show system status (input folder, model availability, last run)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("landscape=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            pdf_dir,
            output_dir,
            n_topics,
            embedding,
            decomposition,
        } => {
            let mut config = Config::load()?;
            if let Some(dir) = pdf_dir {
                config.pdf_dir = dir;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(n) = n_topics {
                config.n_topics = n;
            }
            if embedding {
                config.modeler = ModelerBackend::Embedding;
            } else if decomposition {
                config.modeler = ModelerBackend::Decomposition;
            }

            let summary = landscape::pipeline::run(&config).await?;
            println!(
                "\nAll outputs saved to: {}",
                config.output_dir.display()
            );
            if summary.skipped > 0 {
                println!(
                    "Note: {} of {} documents could not be extracted (see log for reasons)",
                    summary.skipped,
                    summary.skipped + summary.documents
                );
            }
        }

        Commands::DownloadModel => {
            let config = Config::load()?;

            println!("Downloading embedding model...");
            println!("  Destination: {}", config.model_dir.display());

            landscape::topics::download::download_model(&config.model_dir).await?;

            println!("\nModel downloaded successfully.");
            println!("Future `landscape analyze` runs will use embedding-based clustering.");
        }

        Commands::Status => {
            let config = Config::load()?;
            landscape::status::show(&config)?;
        }
    }

    Ok(())
}
