//! Production configuration constants.
//!
//! These values define the retrieval funnel and the index layout. They are
//! used by the query pipeline, the index builder and the benchmarks so all of
//! them agree.
//!
//! # Usage
//!
//! ```
//! use qaseek_core::config::{RetrievalSettings, DEFAULT_CHUNK_TOP_K};
//!
//! let settings = RetrievalSettings::default();
//! assert_eq!(settings.chunk_top_k, DEFAULT_CHUNK_TOP_K);
//! ```

use serde::{Deserialize, Serialize};

// =============================================================================
// Retrieval Funnel
// =============================================================================

/// Number of chunk hits pulled from the similarity scan per query.
pub const DEFAULT_CHUNK_TOP_K: usize = 50;

/// Number of aggregated documents handed to the reranker.
pub const DEFAULT_CANDIDATE_TOP_K: usize = 3;

/// Number of results kept after reranking unless the caller overrides it.
pub const DEFAULT_FINAL_TOP_K: usize = 3;

/// Largest final top_k a caller may request.
pub const MAX_FINAL_TOP_K: usize = 3;

/// Chunk previews kept per aggregated document.
pub const MAX_CHUNKS_PER_DOCUMENT: usize = 3;

/// Characters of chunk text kept in each preview.
pub const PREVIEW_CHARS: usize = 100;

// =============================================================================
// Index Layout
// =============================================================================

/// Words per chunk when splitting answers for embedding.
pub const CHUNK_WORDS: usize = 200;

/// Words shared between consecutive chunks.
pub const CHUNK_OVERLAP_WORDS: usize = 50;

/// Texts sent to the embedding backend per request while indexing.
pub const EMBED_BATCH_SIZE: usize = 32;

/// Embedding model the bundled data files are built with.
pub const DEFAULT_EMBEDDING_MODEL: &str = "intfloat/multilingual-e5-base";

/// Cross-encoder model used for relevance reranking.
pub const DEFAULT_RERANK_MODEL: &str = "jinaai/jina-reranker-v2-base-multilingual";

/// Tunable sizes of the two-tier candidate funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Chunk hits taken from the similarity scan
    pub chunk_top_k: usize,
    /// Documents kept by the candidate selector
    pub candidate_top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            chunk_top_k: DEFAULT_CHUNK_TOP_K,
            candidate_top_k: DEFAULT_CANDIDATE_TOP_K,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_smaller_than_chunk() {
        let (size, overlap) = (CHUNK_WORDS, CHUNK_OVERLAP_WORDS);
        assert!(overlap < size, "overlap must leave the window advancing");
    }

    #[test]
    fn test_default_final_top_k_within_limit() {
        let (default, max) = (DEFAULT_FINAL_TOP_K, MAX_FINAL_TOP_K);
        assert!(default <= max);
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: RetrievalSettings = serde_json::from_str(r#"{"chunk_top_k": 10}"#).unwrap();
        assert_eq!(settings.chunk_top_k, 10);
        assert_eq!(settings.candidate_top_k, DEFAULT_CANDIDATE_TOP_K);
    }
}
