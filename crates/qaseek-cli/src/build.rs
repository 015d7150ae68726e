//! Build command implementation.
//!
//! Turns a directory of marked-up source files into the two data files the
//! ask command reads.

use crate::backends::BackendArgs;
use crate::config::{self, DataFiles};
use anyhow::{anyhow, Context, Result};
use qaseek_core::chunking::WordWindowChunker;
use qaseek_core::config::EMBED_BATCH_SIZE;
use qaseek_core::corpus::{write_chunks, write_documents};
use qaseek_core::processing::{parse_source, IndexingPipeline};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Summary of a finished build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub files: DataFiles,
    pub documents: usize,
    pub chunks: usize,
    pub elapsed_ms: u64,
}

/// Reads every regular file in `dir`, sorted by file name, and joins their
/// contents with newlines.
pub fn read_source_dir(dir: &Path) -> Result<String> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read source directory: {}", dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let mut contents = Vec::with_capacity(paths.len());
    for path in &paths {
        contents.push(
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read source file: {}", path.display()))?,
        );
    }
    Ok(contents.join("\n"))
}

/// Parses, chunks and embeds the source directory, then writes both data
/// files for the configured embedding model.
pub async fn execute_build(
    source_dir: &Path,
    backend: &BackendArgs,
    data_dir: Option<&PathBuf>,
) -> Result<BuildReport> {
    let data_dir = config::get_data_dir(data_dir)?;
    let files = DataFiles::new(&data_dir, &backend.embed_model);

    let source = read_source_dir(source_dir)?;
    let documents = parse_source(&source);
    if documents.is_empty() {
        return Err(anyhow!(
            "No documents found in {}. Each document starts with a `[query] ` line.",
            source_dir.display()
        ));
    }
    info!("Parsed {} documents", documents.len());

    let backend = backend.clone();
    tokio::task::spawn_blocking(move || -> Result<BuildReport> {
        let pipeline = IndexingPipeline::new(
            Arc::new(backend.embedder()?),
            Arc::new(WordWindowChunker::default()),
        );

        let result = pipeline.build_chunks(&documents, EMBED_BATCH_SIZE, |progress| {
            info!(
                "Embedded {}/{} chunks ({:.0}%)",
                progress.chunks_completed,
                progress.chunks_total,
                progress.percent_complete()
            );
        })?;

        fs::create_dir_all(&data_dir).with_context(|| {
            format!("Failed to create data directory: {}", data_dir.display())
        })?;
        write_documents(&files.documents, &documents)?;
        write_chunks(&files.chunks, &result.chunks)?;

        Ok(BuildReport {
            files,
            documents: documents.len(),
            chunks: result.chunk_count(),
            elapsed_ms: result.elapsed_ms,
        })
    })
    .await
    .context("Build task panicked")?
}
