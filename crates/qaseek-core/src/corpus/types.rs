use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a parent question/answer document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Creates a DocumentId from a raw u64 value.
    pub fn from_u64(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value of this ID.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an embedded chunk. Equal to its position in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkId(u64);

impl ChunkId {
    /// Creates a ChunkId from a raw u64 value.
    pub fn from_u64(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value of this ID.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One embedded slice of a document's answer text.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRecord {
    /// Chunk identifier
    pub chunk_id: ChunkId,
    /// Document that owns this chunk
    pub document_id: DocumentId,
    /// Chunk embedding (dimension D, shared by the whole corpus)
    pub embedding: Vec<f32>,
    /// Chunk text shown as a preview in results
    pub preview_text: String,
}

/// Parent question/answer unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Document identifier
    pub document_id: DocumentId,
    /// Question this document answers (used as the result label)
    pub question_text: String,
    /// Full answer text (used for reranking and answer synthesis)
    pub answer_text: String,
    /// External link of the source page
    pub link: String,
}
