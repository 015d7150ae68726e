//! Error types for qaseek-core.
//!
//! Load-time failures ([`CorpusError`]) are kept apart from per-request
//! failures ([`RetrievalError`]): the first must stop the process from
//! starting, the second aborts a single query. [`BackendError`] is what the
//! external embedding, scoring and generation collaborators report.

use crate::corpus::DocumentId;
use crate::rerank::RerankStrategy;
use thiserror::Error;

/// Errors raised while loading the corpus or the document table.
#[derive(Debug, Clone, Error)]
pub enum CorpusError {
    /// A chunk embedding disagrees with the dimension of the first record
    #[error("Schema error: chunk at position {position} has dimension {actual}, expected {expected}")]
    Schema {
        /// Dimension of the first record
        expected: usize,
        /// Dimension of the offending record
        actual: usize,
        /// Position of the offending record in load order
        position: usize,
    },
    /// The first chunk carries a zero-length embedding
    #[error("Schema error: chunk embeddings must not be empty")]
    EmptyEmbedding,
    /// Two document records share the same id
    #[error("Duplicate document id: {0}")]
    DuplicateDocument(DocumentId),
    /// Failed to read or write a data file
    #[error("IO error: {0}")]
    Io(String),
    /// A data file is not valid JSON or has the wrong shape
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Errors that abort a single query.
///
/// None of these are retried or swallowed inside the core.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    /// Query embedding dimension disagrees with the corpus
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Corpus dimension
        expected: usize,
        /// Query dimension
        actual: usize,
    },
    /// A candidate references a document missing from the document table
    #[error("Unknown document: {0}")]
    UnknownDocument(DocumentId),
    /// The reranking backend failed or returned a malformed result
    #[error("Rerank backend error: {0}")]
    RerankBackend(String),
    /// The query could not be embedded
    #[error("Query embedding failed: {0}")]
    QueryEmbedding(String),
    /// The requested strategy has no backend configured
    #[error("Rerank strategy unavailable: {0}")]
    StrategyUnavailable(RerankStrategy),
    /// Answer generation failed
    #[error("Generation failed: {0}")]
    Generation(String),
}

/// Errors reported by external collaborators (embedding model, cross-encoder,
/// generation model).
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The call to the backend failed
    #[error("Request failed: {0}")]
    RequestFailed(String),
    /// The backend answered with something unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// The backend is not configured or not reachable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by chunking strategies.
#[derive(Debug, Clone, Error)]
pub enum ChunkingError {
    /// Invalid chunking configuration
    #[error("Invalid chunking config: {0}")]
    InvalidConfig(String),
}

/// Errors raised while building a corpus from source files.
#[derive(Debug, Clone, Error)]
pub enum IndexingError {
    /// Chunker rejected its configuration
    #[error(transparent)]
    Chunking(#[from] ChunkingError),
    /// Embedding backend failed during indexing
    #[error("Embedding failed: {0}")]
    Embedding(String),
    /// Produced embeddings do not form a valid corpus
    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

impl From<std::io::Error> for CorpusError {
    fn from(err: std::io::Error) -> Self {
        CorpusError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CorpusError {
    fn from(err: serde_json::Error) -> Self {
        CorpusError::Parse(err.to_string())
    }
}

impl From<BackendError> for IndexingError {
    fn from(err: BackendError) -> Self {
        IndexingError::Embedding(err.to_string())
    }
}
