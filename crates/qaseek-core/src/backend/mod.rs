//! Model collaborator abstractions.
//!
//! ## Core Traits
//!
//! - [`TextEmbedder`] - text → vector, used for query encoding, embedding
//!   rerank and index building
//! - [`PairScorer`] - (query, passage) → relevance, used by cross-encoder rerank
//! - [`AnswerGenerator`] - prompt → text, used for answer synthesis
//!
//! Concrete clients live with the binary that configures them.

mod traits;

pub use traits::{AnswerGenerator, PairScorer, TextEmbedder};
