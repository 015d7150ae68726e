//! # Qaseek Core
//!
//! Candidate retrieval and multi-stage reranking for question/answer search.
//!
//! A question is embedded, matched against every chunk of every indexed
//! answer, grouped back into documents, narrowed to a few candidates,
//! reranked with a more expensive signal and finally collapsed into one
//! entry per source link. Models are external collaborators reached through
//! the traits in [`backend`].
//!
//! ## Modules
//!
//! - [`corpus`] - Immutable chunk/document tables and their JSON data files
//! - [`search`] - Cosine scan, per-document aggregation, candidate selection
//! - [`rerank`] - Embedding and cross-encoder reranking strategies
//! - [`compose`] - Link deduplication of the final ranking
//! - [`query`] - End-to-end query pipeline
//! - [`generation`] - Prompt assembly for answer synthesis
//! - [`backend`] - Embedding, pair-scoring and generation model contracts
//! - [`chunking`] - Word-window chunking of answers
//! - [`processing`] - Source parsing and index building
//! - [`text`] - Query normalization
//! - [`config`] - Production configuration constants
//! - [`error`] - Error types

pub mod backend;
pub mod chunking;
pub mod compose;
pub mod config;
pub mod corpus;
pub mod error;
pub mod generation;
pub mod processing;
pub mod query;
pub mod rerank;
pub mod search;
pub mod text;

#[cfg(test)]
pub(crate) mod test_utils;
