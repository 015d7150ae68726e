//! Qaseek CLI - question answering over a pre-indexed Q/A corpus.
//!
//! # Usage
//!
//! ```bash
//! # Build the index from marked-up source files
//! qs build --source ./pages
//!
//! # Ask a question (inline flags: -s scores, -ce cross-encoder, -1..-3 results)
//! qs ask how do I reset my password
//! qs ask how do I reset my password -s -ce -2
//! qs ask --rag --json how do I reset my password
//!
//! # Show help
//! qs --help
//! ```

mod ask;
mod backends;
mod build;
mod config;
mod flags;
mod output;
mod qa_log;

use anyhow::Result;
use backends::BackendArgs;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Qaseek question answering CLI.
///
/// Finds the best matching pages of an indexed Q/A corpus for a question,
/// optionally generating an answer from them.
#[derive(Parser)]
#[command(name = "qs", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Custom data directory (default: platform standard location)
    #[arg(long, env = "QASEEK_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    backend: BackendArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a question from the index
    Ask {
        /// Generate an answer from the ranked sources
        #[arg(long)]
        rag: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Question words, optionally mixed with -s, -ce, -1, -2, -3
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        question: Vec<String>,
    },

    /// Build the index from a directory of source files
    Build {
        /// Directory holding the source files
        #[arg(long)]
        source: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Command::Ask {
            rag,
            json,
            question,
        } => {
            let raw_question = question.join(" ");
            let report =
                ask::execute_ask(&raw_question, *rag, &cli.backend, cli.data_dir.as_ref()).await?;

            let output = if *json {
                output::format_json(&report)
            } else {
                output::format_human(&report)
            };

            println!("{}", output);
        }
        Command::Build { source } => {
            let report = build::execute_build(source, &cli.backend, cli.data_dir.as_ref()).await?;
            println!(
                "Indexed {} documents into {} chunks in {:.1}s",
                report.documents,
                report.chunks,
                report.elapsed_ms as f64 / 1000.0
            );
            println!("  {}", report.files.documents.display());
            println!("  {}", report.files.chunks.display());
        }
    }

    Ok(())
}
