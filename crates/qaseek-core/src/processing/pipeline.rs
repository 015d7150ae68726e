//! Indexing pipeline for building the chunk corpus.
//!
//! The `IndexingPipeline` coordinates chunking and batched embedding of
//! every document answer.

use super::progress::{IndexingProgress, ProgressTimer};
use crate::backend::TextEmbedder;
use crate::chunking::ChunkingStrategy;
use crate::corpus::{ChunkId, ChunkRecord, DocumentId, DocumentRecord};
use crate::error::{CorpusError, IndexingError};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Chunks produced by an index build.
#[derive(Debug, Clone)]
pub struct IndexingResult {
    /// Embedded chunks with ids equal to their position
    pub chunks: Vec<ChunkRecord>,
    /// Build time in milliseconds
    pub elapsed_ms: u64,
}

impl IndexingResult {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Embedding dimension, or 0 when no chunks were produced.
    pub fn dimension(&self) -> usize {
        self.chunks.first().map_or(0, |chunk| chunk.embedding.len())
    }
}

/// A chunk waiting to be embedded.
struct PendingChunk<'d> {
    document_id: DocumentId,
    question: &'d str,
    text: String,
}

/// Indexing pipeline for building chunk embeddings.
///
/// # Thread Safety
///
/// The pipeline is `Send + Sync`. The embedder and chunker are shared
/// through `Arc`.
pub struct IndexingPipeline {
    embedder: Arc<dyn TextEmbedder>,
    chunker: Arc<dyn ChunkingStrategy>,
}

impl IndexingPipeline {
    pub fn new(embedder: Arc<dyn TextEmbedder>, chunker: Arc<dyn ChunkingStrategy>) -> Self {
        Self { embedder, chunker }
    }

    /// Chunks every answer and embeds the chunks in batches.
    ///
    /// Each chunk is embedded as `"<question> <chunk text>"` so the question
    /// contributes to every chunk's vector. Chunks keep document order and
    /// get ids equal to their position. `batch_size` of 0 is treated as 1.
    ///
    /// # Errors
    ///
    /// - `IndexingError::Chunking` if the chunker fails
    /// - `IndexingError::Embedding` if the embedder fails or returns the
    ///   wrong number of vectors for a batch
    /// - `IndexingError::Corpus` if a vector is empty or its dimension
    ///   differs from the first one
    #[instrument(skip_all, fields(documents = documents.len(), batch_size = batch_size, chunker = self.chunker.name()))]
    pub fn build_chunks<F>(
        &self,
        documents: &[DocumentRecord],
        batch_size: usize,
        mut on_progress: F,
    ) -> Result<IndexingResult, IndexingError>
    where
        F: FnMut(IndexingProgress),
    {
        let timer = ProgressTimer::new();
        let batch_size = batch_size.max(1);

        let mut pending = Vec::new();
        for doc in documents {
            for chunk in self.chunker.chunk(&doc.answer_text)? {
                pending.push(PendingChunk {
                    document_id: doc.document_id,
                    question: &doc.question_text,
                    text: chunk.text,
                });
            }
        }

        let total_chunks = pending.len();
        debug!(total_chunks, "chunked documents");
        on_progress(IndexingProgress::new(0, total_chunks, timer.elapsed_ms()));

        let mut chunks: Vec<ChunkRecord> = Vec::with_capacity(total_chunks);
        let mut dimension: Option<usize> = None;

        for batch in pending.chunks(batch_size) {
            let inputs: Vec<String> = batch
                .iter()
                .map(|chunk| format!("{} {}", chunk.question, chunk.text))
                .collect();
            let texts: Vec<&str> = inputs.iter().map(String::as_str).collect();

            let embeddings = self.embedder.embed(&texts)?;
            if embeddings.len() != batch.len() {
                return Err(IndexingError::Embedding(format!(
                    "embedder returned {} vectors for {} inputs",
                    embeddings.len(),
                    batch.len()
                )));
            }

            for (chunk, embedding) in batch.iter().zip(embeddings) {
                let position = chunks.len();
                match dimension {
                    None if embedding.is_empty() => return Err(CorpusError::EmptyEmbedding.into()),
                    None => dimension = Some(embedding.len()),
                    Some(expected) if expected != embedding.len() => {
                        return Err(CorpusError::Schema {
                            expected,
                            actual: embedding.len(),
                            position,
                        }
                        .into())
                    }
                    Some(_) => {}
                }

                chunks.push(ChunkRecord {
                    chunk_id: ChunkId::from_u64(position as u64),
                    document_id: chunk.document_id,
                    embedding,
                    preview_text: chunk.text.clone(),
                });
            }

            on_progress(IndexingProgress::new(
                chunks.len(),
                total_chunks,
                timer.elapsed_ms(),
            ));
        }

        let elapsed_ms = timer.elapsed_ms();
        info!(
            chunks = chunks.len(),
            dimension = dimension.unwrap_or(0),
            elapsed_ms,
            "built chunk embeddings"
        );

        Ok(IndexingResult { chunks, elapsed_ms })
    }
}
