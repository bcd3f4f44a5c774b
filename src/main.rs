//! # docvec CLI
//!
//! Convert PDF documents into vector embeddings and ask questions over them.
//!
//! ## Usage
//!
//! ```bash
//! docvec --config ./docvec.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docvec process <pdf>` | Extract, chunk, embed, and store one PDF |
//! | `docvec watch` | Interactive loop: ask questions, ingest more PDFs |
//!
//! ## Examples
//!
//! ```bash
//! # Ingest a document into the default storage directory
//! docvec process ./paper.pdf
//!
//! # Ingest into a specific storage directory
//! docvec process ./paper.pdf --storage-dir ./index
//!
//! # Ask questions interactively
//! docvec watch --storage-dir ./index
//! ```
//!
//! Remote providers read their credentials from `OPENAI_API_KEY` and
//! `ANTHROPIC_API_KEY`; the default configuration runs fully offline with
//! the deterministic hash embedder and no chat provider.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
use tracing_subscriber::EnvFilter;

use docvec::config;
use docvec::error::Error;
use docvec::extract::extract_pdf_text;
use docvec::models::Document;
use docvec::pipeline::RetrievalPipeline;
use docvec::task::JobSlot;

/// Convert PDF documents into vector embeddings for semantic search and
/// question answering.
#[derive(Parser)]
#[command(
    name = "docvec",
    about = "Convert PDF documents into vector embeddings for semantic search and question answering",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when the file
    /// does not exist.
    #[arg(long, global = true, default_value = "./docvec.toml")]
    config: PathBuf,

    /// Override the storage directory holding the vector index.
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single PDF file.
    ///
    /// Extracts the text, chunks it, embeds each chunk, and stores the
    /// result in the vector index.
    Process {
        /// Path to the PDF file to process.
        path: PathBuf,
    },

    /// Interactive question loop.
    ///
    /// Reads questions from stdin and prints the answer with its sources.
    /// `:ingest <path>` converts another PDF in the background;
    /// `exit` quits.
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = config::load_config(&cli.config)?;
    if let Some(dir) = cli.storage_dir {
        config.storage.dir = dir;
    }

    match cli.command {
        Commands::Process { path } => {
            let mut pipeline = RetrievalPipeline::new(&config)?;
            let count = pipeline.ingest_file(&path).await?;
            println!("Processed {} ({} chunks stored)", path.display(), count);
        }
        Commands::Watch => {
            let pipeline = RetrievalPipeline::new(&config)?;
            run_watch(pipeline).await?;
        }
    }

    Ok(())
}

/// Interactive loop: questions answered inline, conversions run through the
/// single background job slot so the prompt stays responsive.
async fn run_watch(mut pipeline: RetrievalPipeline) -> anyhow::Result<()> {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut conversions: JobSlot<(String, String)> = JobSlot::new();

    println!("Enter a question, ':ingest <path>' to add a PDF, or 'exit' to quit.");

    loop {
        collect_finished_conversion(&mut conversions, &mut pipeline).await;

        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") {
            break;
        }

        if let Some(path) = input.strip_prefix(":ingest") {
            submit_conversion(&mut conversions, path.trim());
            continue;
        }

        match pipeline.answer(input).await {
            Ok(answer) => {
                println!("\nAnswer:");
                println!("{}", answer.answer);
                println!("\nSources:");
                for source in &answer.sources {
                    println!("- {} (Chunk {})", source.filename, source.chunk_index);
                    let preview: String = source.text.chars().take(200).collect();
                    println!("  {}", preview);
                }
                println!();
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}

/// Spawn a background PDF conversion, unless one is already running.
fn submit_conversion(conversions: &mut JobSlot<(String, String)>, path: &str) {
    if path.is_empty() {
        eprintln!("Usage: :ingest <path-to-pdf>");
        return;
    }

    let path = PathBuf::from(path);
    let source_id = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let submitted = conversions.submit(async move {
        let text = tokio::task::spawn_blocking(move || extract_pdf_text(&path))
            .await
            .map_err(|e| Error::Conversion(format!("background task aborted: {}", e)))??;
        Ok((source_id, text))
    });

    if submitted {
        println!("Converting in the background; keep asking questions meanwhile.");
    } else {
        println!("A conversion is already running; try again once it finishes.");
    }
}

/// Ingest the result of a finished background conversion, if any.
async fn collect_finished_conversion(
    conversions: &mut JobSlot<(String, String)>,
    pipeline: &mut RetrievalPipeline,
) {
    if let Some(outcome) = conversions.take_finished().await {
        match outcome {
            Ok((source_id, text)) => {
                match pipeline
                    .ingest_document(&Document {
                        source_id: source_id.clone(),
                        text,
                    })
                    .await
                {
                    Ok(count) => println!("Ingested {} ({} chunks stored)", source_id, count),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}
