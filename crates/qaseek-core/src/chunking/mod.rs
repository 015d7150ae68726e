//! Text chunking strategies for document processing.
//!
//! Answers are split into overlapping windows before embedding so that long
//! answers are matched at a finer grain than the whole document. Each chunk
//! later becomes one [`ChunkRecord`](crate::corpus::ChunkRecord) whose text
//! is shown as a preview in search results.

mod types;
mod word_window;

use crate::error::ChunkingError;

pub use types::TextChunk;
pub use word_window::WordWindowChunker;

/// Trait for text chunking strategies.
///
/// Chunks are returned in document order with ascending `index`.
pub trait ChunkingStrategy: Send + Sync {
    /// Splits text into chunks according to this strategy.
    fn chunk(&self, text: &str) -> Result<Vec<TextChunk>, ChunkingError>;

    /// Returns a human-readable name for this strategy.
    fn name(&self) -> &'static str;

    /// Returns the maximum number of words per chunk.
    fn max_words(&self) -> usize;
}
