//! Traits for the external model collaborators.
//!
//! The core never runs a model itself. These narrow contracts let the caller
//! plug in HTTP clients, local runtimes or deterministic stubs for tests.

use crate::error::BackendError;

/// Text embedding model.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: one instance is shared by every
/// request handler. Calls are blocking and are made without holding any lock.
///
/// # Examples
///
/// ```ignore
/// let embedder: Arc<dyn TextEmbedder> = Arc::new(HttpEmbedder::new(...)?);
///
/// let vectors = embedder.embed(&["how do I reset my password"])?;
/// assert_eq!(vectors.len(), 1);
/// ```
pub trait TextEmbedder: Send + Sync {
    /// Embeds each text, returning one vector per input in input order.
    ///
    /// Output must be deterministic for a fixed model version and every
    /// vector must have the model's dimension.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, BackendError>;

    /// Returns the model identifier (e.g., "intfloat/multilingual-e5-base").
    fn model_id(&self) -> &str;
}

/// Cross-encoder relevance model.
///
/// Scores are an opaque, unbounded relevance signal. They are only comparable
/// within one call.
pub trait PairScorer: Send + Sync {
    /// Scores `(query, passage)` pairs, returning one score per pair.
    fn score_pairs(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, BackendError>;

    /// Returns the model identifier.
    fn model_id(&self) -> &str;
}

/// Text generation model used for answer synthesis.
pub trait AnswerGenerator: Send + Sync {
    /// Completes a prompt.
    fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}
