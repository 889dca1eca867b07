//! # Lectern CLI (`lectern`)
//!
//! ## Usage
//!
//! ```bash
//! lectern --config ./config/lectern.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lectern serve` | Start the HTTP API |
//! | `lectern chunk <pdf>` | Extract and chunk a PDF, print passage statistics |
//! | `lectern ask "<question>" --pdf <file>...` | Answer a question from the given PDFs |
//! | `lectern summarize --pdf <file>...` | Summarize the given PDFs |
//! | `lectern quiz --pdf <file>...` | Generate a multiple-choice quiz |
//!
//! `ask`, `summarize` and `quiz` load the files into a fresh in-memory
//! notebook, run once, and exit.
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lectern::config::{self, Config};
use lectern::extract::{detect_content_type, extract_text};
use lectern::notebook::Notebook;
use lectern::server;
use lectern_core::chunk::{chunk_text, word_count};

/// Lectern: ask questions about your PDFs.
#[derive(Parser)]
#[command(
    name = "lectern",
    about = "Lectern: retrieval-augmented answers, summaries and quizzes over your PDFs",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults to `./config/lectern.toml`;
    /// built-in defaults apply when the file does not exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API on `[server].bind`.
    Serve,

    /// Extract a PDF and show how it would be chunked. No embedding or
    /// network access.
    Chunk {
        /// PDF file to chunk.
        pdf: PathBuf,

        /// Print every passage in full.
        #[arg(long)]
        full: bool,
    },

    /// Answer a question from one or more PDFs.
    Ask {
        question: String,

        /// PDF files to answer from.
        #[arg(long = "pdf", required = true)]
        pdfs: Vec<PathBuf>,

        /// Also print the supporting passages.
        #[arg(long)]
        show_passages: bool,
    },

    /// Summarize one or more PDFs.
    Summarize {
        #[arg(long = "pdf", required = true)]
        pdfs: Vec<PathBuf>,
    },

    /// Generate a multiple-choice quiz from one or more PDFs.
    Quiz {
        #[arg(long = "pdf", required = true)]
        pdfs: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .ok();

    let cli = Cli::parse();
    let cfg = config::load_config(&config::config_path(cli.config))?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Chunk { pdf, full } => {
            run_chunk(&cfg, &pdf, full)?;
        }
        Commands::Ask {
            question,
            pdfs,
            show_passages,
        } => {
            let (notebook, ids) = load_notebook(&cfg, &pdfs).await?;
            let answer = notebook.ask(&question, &ids).await?;
            println!("{}", answer.answer);
            if show_passages {
                for (i, passage) in answer.supporting_passages.iter().enumerate() {
                    println!("\n--- passage {} ---\n{}", i + 1, passage);
                }
            }
        }
        Commands::Summarize { pdfs } => {
            let (notebook, ids) = load_notebook(&cfg, &pdfs).await?;
            println!("{}", notebook.summarize(&ids).await?);
        }
        Commands::Quiz { pdfs } => {
            let (notebook, ids) = load_notebook(&cfg, &pdfs).await?;
            println!("{}", notebook.generate_quiz(&ids).await?);
        }
    }

    Ok(())
}

fn read_pdf(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((name, bytes))
}

fn run_chunk(cfg: &Config, path: &Path, full: bool) -> Result<()> {
    let (name, bytes) = read_pdf(path)?;
    let text = extract_text(&bytes, &detect_content_type(&name, None, &bytes))?;
    let passages = chunk_text(&text, cfg.chunking.max_words);
    if passages.is_empty() {
        bail!("No text could be extracted from '{}'", name);
    }

    println!(
        "{}: {} passages (max {} words)",
        name,
        passages.len(),
        cfg.chunking.max_words
    );
    for (i, passage) in passages.iter().enumerate() {
        let words = word_count(passage);
        let chars = passage.chars().count();
        if full {
            println!("\n[{}] {} words, {} chars\n{}", i, words, chars, passage);
        } else {
            let preview: String = passage.chars().take(60).collect();
            println!("[{}] {} words, {} chars  {}", i, words, chars, preview);
        }
    }
    Ok(())
}

async fn load_notebook(cfg: &Config, pdfs: &[PathBuf]) -> Result<(Notebook, Vec<String>)> {
    let notebook = Notebook::from_config(cfg)?;
    let mut ids = Vec::with_capacity(pdfs.len());
    for path in pdfs {
        let (name, bytes) = read_pdf(path)?;
        let summary = notebook.ingest(&name, None, bytes).await?;
        ids.push(summary.id);
    }
    Ok((notebook, ids))
}
