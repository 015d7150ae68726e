//! Immutable in-memory corpus.
//!
//! [`VectorCorpus`] holds every chunk embedding, [`DocumentTable`] holds the
//! parent question/answer records. Both are loaded once at startup and never
//! mutated; [`KnowledgeBase`] bundles them so request handlers can share one
//! `Arc<KnowledgeBase>` without locking.

mod persist;
mod types;

pub use persist::{
    chunks_file_name, documents_file_name, read_chunks, read_documents, sanitize_model_name,
    write_chunks, write_documents,
};
pub use types::{ChunkId, ChunkRecord, DocumentId, DocumentRecord};

use crate::error::{CorpusError, RetrievalError};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Read-only store of chunk embeddings.
///
/// Every embedding has the same dimension; this is checked once in
/// [`VectorCorpus::load`] so the similarity scan never has to.
#[derive(Debug, Clone, Default)]
pub struct VectorCorpus {
    chunks: Vec<ChunkRecord>,
    dimension: usize,
}

impl VectorCorpus {
    /// Builds a corpus from chunk records.
    ///
    /// # Errors
    ///
    /// - [`CorpusError::EmptyEmbedding`] if the first record has no components
    /// - [`CorpusError::Schema`] if any record's dimension differs from the
    ///   first record's
    pub fn load(chunks: Vec<ChunkRecord>) -> Result<Self, CorpusError> {
        let dimension = match chunks.first() {
            Some(first) if first.embedding.is_empty() => return Err(CorpusError::EmptyEmbedding),
            Some(first) => first.embedding.len(),
            None => 0,
        };

        if let Some((position, chunk)) = chunks
            .iter()
            .enumerate()
            .find(|(_, chunk)| chunk.embedding.len() != dimension)
        {
            return Err(CorpusError::Schema {
                expected: dimension,
                actual: chunk.embedding.len(),
                position,
            });
        }

        info!(chunks = chunks.len(), dimension, "loaded vector corpus");
        Ok(Self { chunks, dimension })
    }

    /// Embedding dimension shared by all chunks (0 for an empty corpus).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Iterates over chunks in load order. Restartable: each call scans from
    /// the beginning.
    pub fn iter(&self) -> std::slice::Iter<'_, ChunkRecord> {
        self.chunks.iter()
    }

    /// Returns the chunk at a load-order position.
    pub fn get(&self, position: usize) -> Option<&ChunkRecord> {
        self.chunks.get(position)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl<'a> IntoIterator for &'a VectorCorpus {
    type Item = &'a ChunkRecord;
    type IntoIter = std::slice::Iter<'a, ChunkRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lookup table of document records keyed by id.
#[derive(Debug, Clone, Default)]
pub struct DocumentTable {
    records: HashMap<DocumentId, DocumentRecord>,
}

impl DocumentTable {
    /// Builds the table, rejecting duplicate ids.
    pub fn from_records(records: Vec<DocumentRecord>) -> Result<Self, CorpusError> {
        let mut table = HashMap::with_capacity(records.len());
        for record in records {
            let id = record.document_id;
            if table.insert(id, record).is_some() {
                return Err(CorpusError::DuplicateDocument(id));
            }
        }
        Ok(Self { records: table })
    }

    /// Resolves a document id.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::UnknownDocument`] if the id is absent.
    pub fn lookup(&self, document_id: DocumentId) -> Result<&DocumentRecord, RetrievalError> {
        self.records
            .get(&document_id)
            .ok_or(RetrievalError::UnknownDocument(document_id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The process-wide, init-only retrieval state.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    pub corpus: VectorCorpus,
    pub documents: DocumentTable,
}

impl KnowledgeBase {
    pub fn new(corpus: VectorCorpus, documents: DocumentTable) -> Self {
        Self { corpus, documents }
    }

    /// Loads both data files and validates them.
    ///
    /// # Errors
    ///
    /// Any [`CorpusError`]: unreadable or malformed files, inconsistent
    /// embedding dimensions, duplicate document ids.
    pub fn open(documents_path: &Path, chunks_path: &Path) -> Result<Self, CorpusError> {
        let documents = DocumentTable::from_records(read_documents(documents_path)?)?;
        let corpus = VectorCorpus::load(read_chunks(chunks_path)?)?;

        info!(
            documents = documents.len(),
            chunks = corpus.len(),
            dimension = corpus.dimension(),
            "knowledge base loaded"
        );
        Ok(Self::new(corpus, documents))
    }
}
