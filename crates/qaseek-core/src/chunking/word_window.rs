use super::{ChunkingStrategy, TextChunk};
use crate::config::{CHUNK_OVERLAP_WORDS, CHUNK_WORDS};
use crate::error::ChunkingError;

/// Fixed-size word windows with overlap.
///
/// Text is split on whitespace. Each window holds up to `chunk_words` words
/// and the next one starts `chunk_words - overlap_words` words later. The
/// final window always ends at the last word, so no text is dropped and no
/// window is emitted past the end.
#[derive(Debug, Clone, Copy)]
pub struct WordWindowChunker {
    chunk_words: usize,
    overlap_words: usize,
}

impl WordWindowChunker {
    /// Creates a chunker.
    ///
    /// # Errors
    ///
    /// `ChunkingError::InvalidConfig` if `chunk_words` is zero or the overlap
    /// is not smaller than the window.
    pub fn new(chunk_words: usize, overlap_words: usize) -> Result<Self, ChunkingError> {
        if chunk_words == 0 {
            return Err(ChunkingError::InvalidConfig(
                "chunk size must be at least one word".to_string(),
            ));
        }
        if overlap_words >= chunk_words {
            return Err(ChunkingError::InvalidConfig(format!(
                "overlap ({}) must be smaller than chunk size ({})",
                overlap_words, chunk_words
            )));
        }
        Ok(Self {
            chunk_words,
            overlap_words,
        })
    }

    pub fn overlap_words(&self) -> usize {
        self.overlap_words
    }
}

impl Default for WordWindowChunker {
    fn default() -> Self {
        Self {
            chunk_words: CHUNK_WORDS,
            overlap_words: CHUNK_OVERLAP_WORDS,
        }
    }
}

impl ChunkingStrategy for WordWindowChunker {
    fn chunk(&self, text: &str) -> Result<Vec<TextChunk>, ChunkingError> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let step = self.chunk_words - self.overlap_words;

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + self.chunk_words).min(words.len());
            chunks.push(TextChunk {
                index: chunks.len(),
                text: words[start..end].join(" "),
                start_word: start,
                end_word: end,
            });
            if end == words.len() {
                break;
            }
            start += step;
        }

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "word-window"
    }

    fn max_words(&self) -> usize {
        self.chunk_words
    }
}
