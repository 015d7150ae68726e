//! JSON data files for documents and chunk embeddings.
//!
//! Two flat files make up an index:
//!
//! - documents: `[{"id": 0, "question": "...", "link": "...", "answer": "..."}]`
//! - chunks: `[{"question_id": "0000", "chunk_text": "...", "embedding": [..]}]`
//!
//! A chunk's id is its position in the chunk file. `question_id` is written
//! zero-padded and read back either as a padded string or as a number.

use super::types::{ChunkId, ChunkRecord, DocumentId, DocumentRecord};
use crate::error::CorpusError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    id: u64,
    question: String,
    #[serde(default)]
    link: Option<String>,
    answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredChunk {
    question_id: StoredQuestionId,
    #[serde(default)]
    chunk_text: String,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredQuestionId {
    Number(u64),
    Text(String),
}

impl StoredQuestionId {
    fn document_id(&self, position: usize) -> Result<DocumentId, CorpusError> {
        match self {
            StoredQuestionId::Number(id) => Ok(DocumentId::from_u64(*id)),
            StoredQuestionId::Text(text) => text
                .trim()
                .parse::<u64>()
                .map(DocumentId::from_u64)
                .map_err(|_| {
                    CorpusError::Parse(format!(
                        "chunk {}: question_id {:?} is not an integer",
                        position, text
                    ))
                }),
        }
    }
}

/// Reads document records from a JSON documents file.
pub fn read_documents(path: &Path) -> Result<Vec<DocumentRecord>, CorpusError> {
    let file = File::open(path)
        .map_err(|e| CorpusError::Io(format!("{}: {}", path.display(), e)))?;
    let stored: Vec<StoredDocument> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| CorpusError::Parse(format!("{}: {}", path.display(), e)))?;

    debug!(documents = stored.len(), path = %path.display(), "read documents");
    Ok(stored
        .into_iter()
        .map(|doc| DocumentRecord {
            document_id: DocumentId::from_u64(doc.id),
            question_text: doc.question,
            answer_text: doc.answer,
            link: doc.link.unwrap_or_default(),
        })
        .collect())
}

/// Reads chunk records from a JSON chunk file.
///
/// Dimensions are not checked here; pass the result to
/// [`VectorCorpus::load`](super::VectorCorpus::load).
pub fn read_chunks(path: &Path) -> Result<Vec<ChunkRecord>, CorpusError> {
    let file = File::open(path)
        .map_err(|e| CorpusError::Io(format!("{}: {}", path.display(), e)))?;
    let stored: Vec<StoredChunk> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| CorpusError::Parse(format!("{}: {}", path.display(), e)))?;

    debug!(chunks = stored.len(), path = %path.display(), "read chunks");
    stored
        .into_iter()
        .enumerate()
        .map(|(position, chunk)| {
            Ok(ChunkRecord {
                chunk_id: ChunkId::from_u64(position as u64),
                document_id: chunk.question_id.document_id(position)?,
                embedding: chunk.embedding,
                preview_text: chunk.chunk_text,
            })
        })
        .collect()
}

/// Writes document records as a pretty-printed JSON documents file.
pub fn write_documents(path: &Path, documents: &[DocumentRecord]) -> Result<(), CorpusError> {
    let stored: Vec<StoredDocument> = documents
        .iter()
        .map(|doc| StoredDocument {
            id: doc.document_id.as_u64(),
            question: doc.question_text.clone(),
            link: (!doc.link.is_empty()).then(|| doc.link.clone()),
            answer: doc.answer_text.clone(),
        })
        .collect();
    write_json(path, &stored)
}

/// Writes chunk records as a JSON chunk file.
///
/// Chunk ids are not stored; records must already be in id order.
pub fn write_chunks(path: &Path, chunks: &[ChunkRecord]) -> Result<(), CorpusError> {
    let stored: Vec<StoredChunk> = chunks
        .iter()
        .map(|chunk| StoredChunk {
            question_id: StoredQuestionId::Text(format!("{:04}", chunk.document_id.as_u64())),
            chunk_text: chunk.preview_text.clone(),
            embedding: chunk.embedding.clone(),
        })
        .collect();
    write_json(path, &stored)
}

/// Makes a model id usable inside a file name.
///
/// `/` becomes `-`; anything other than ASCII letters, digits, space and
/// `-_.()` is dropped.
pub fn sanitize_model_name(model: &str) -> String {
    model
        .replace('/', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || "-_.() ".contains(*c))
        .collect()
}

/// File name of the documents file built with `model`.
pub fn documents_file_name(model: &str) -> String {
    format!("raw_{}.json", sanitize_model_name(model))
}

/// File name of the chunk embedding file built with `model`.
pub fn chunks_file_name(model: &str) -> String {
    format!("dataset_{}.json", sanitize_model_name(model))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CorpusError> {
    let file = File::create(path)
        .map_err(|e| CorpusError::Io(format!("{}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
