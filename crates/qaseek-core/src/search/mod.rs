//! Candidate retrieval: similarity scan, per-document aggregation and
//! candidate selection.
//!
//! # Architecture
//!
//! - `types`: hit, preview and candidate types plus dimension validation
//! - `vector`: brute-force cosine scan producing ranked [`ChunkHit`]s
//! - `aggregation`: groups hits by document (max score, top-3 previews)
//! - `selection`: truncates aggregated documents to the candidate funnel
//!
//! # Usage
//!
//! ```ignore
//! use qaseek_core::search::{aggregate, search, select_candidates};
//!
//! let hits = search(&query_embedding, &kb.corpus, 50)?;
//! let aggregation = aggregate(&hits);
//! let candidates = select_candidates(&aggregation, 3);
//! ```
//!
//! # Determinism
//!
//! Every ordering step uses a total order: scores compare with `total_cmp`,
//! chunk ties fall back to corpus position and document ties fall back to
//! first-seen order in the scan. Identical inputs produce identical output.

pub mod types;

mod aggregation;
mod selection;
#[doc(hidden)]
pub mod vector;

pub use aggregation::{aggregate, DocumentAggregation};
pub use selection::select_candidates;
pub use types::{
    validate_dimension, AggregatedDocument, Candidate, ChunkHit, ChunkPreview, TopChunks,
};
pub use vector::{cosine_similarity, search};
