use crate::config::{MAX_CHUNKS_PER_DOCUMENT, PREVIEW_CHARS};
use crate::corpus::{ChunkId, DocumentId};
use crate::error::RetrievalError;
use std::cmp::Ordering;

/// A chunk matched by the similarity scan.
///
/// Borrows its preview text from the corpus, so hits live no longer than the
/// corpus they were produced from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkHit<'c> {
    /// Matched chunk
    pub chunk_id: ChunkId,
    /// Document owning the chunk
    pub document_id: DocumentId,
    /// Cosine similarity to the query in [-1, 1]
    pub score: f32,
    /// Chunk text from the corpus
    pub preview_text: &'c str,
}

/// One chunk preview kept for an aggregated document.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkPreview {
    pub score: f32,
    /// First `PREVIEW_CHARS` characters of the chunk text
    pub text: String,
}

impl ChunkPreview {
    pub fn new(score: f32, chunk_text: &str) -> Self {
        Self {
            score,
            text: chunk_text.chars().take(PREVIEW_CHARS).collect(),
        }
    }
}

/// Fixed-capacity list of the best chunk previews for one document.
///
/// Always sorted by score descending and never longer than
/// `MAX_CHUNKS_PER_DOCUMENT`. A preview whose score ties an existing one is
/// placed after it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopChunks {
    previews: Vec<ChunkPreview>,
}

impl TopChunks {
    pub fn new() -> Self {
        Self {
            previews: Vec::with_capacity(MAX_CHUNKS_PER_DOCUMENT + 1),
        }
    }

    /// Offers a preview; keeps it only if it ranks among the best.
    pub fn offer(&mut self, preview: ChunkPreview) {
        let position = self
            .previews
            .iter()
            .position(|kept| score_order(preview.score, kept.score) == Ordering::Less)
            .unwrap_or(self.previews.len());

        if position >= MAX_CHUNKS_PER_DOCUMENT {
            return;
        }
        self.previews.insert(position, preview);
        self.previews.truncate(MAX_CHUNKS_PER_DOCUMENT);
    }

    pub fn as_slice(&self) -> &[ChunkPreview] {
        &self.previews
    }

    pub fn len(&self) -> usize {
        self.previews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.previews.is_empty()
    }
}

/// A document summarised from its chunk hits.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedDocument {
    pub document_id: DocumentId,
    /// Highest chunk score seen for this document
    pub best_score: f32,
    /// Up to three best chunk previews, best first
    pub top_chunks: TopChunks,
}

/// A document surviving the first selection funnel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub document_id: DocumentId,
    pub score: f32,
}

/// Orders scores for a descending sort: higher scores come first.
///
/// Uses `total_cmp` so NaN sorts deterministically instead of poisoning the
/// comparison.
pub fn score_order(a: f32, b: f32) -> Ordering {
    b.total_cmp(&a)
}

/// Validates that an embedding has the expected dimension.
///
/// Returns `Ok(())` if dimensions match, or
/// `Err(RetrievalError::DimensionMismatch)` otherwise.
pub fn validate_dimension(expected: usize, actual: usize) -> Result<(), RetrievalError> {
    if actual == expected {
        Ok(())
    } else {
        Err(RetrievalError::DimensionMismatch { expected, actual })
    }
}
