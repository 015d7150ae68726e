//! Types for text chunking.

/// A chunk of text with its position in the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Index of this chunk in the document (0-based)
    pub index: usize,
    /// Chunk words joined by single spaces
    pub text: String,
    /// Index of the first word of this chunk
    pub start_word: usize,
    /// Index one past the last word of this chunk
    pub end_word: usize,
}
