use super::ensure_len;
use crate::backend::TextEmbedder;
use crate::error::RetrievalError;
use crate::search::cosine_similarity;

/// Embeds every full answer in one batch and scores it against the query.
pub(super) fn score_answers(
    embedder: &dyn TextEmbedder,
    query_embedding: &[f32],
    answers: &[&str],
) -> Result<Vec<f32>, RetrievalError> {
    let vectors = embedder
        .embed(answers)
        .map_err(|e| RetrievalError::RerankBackend(e.to_string()))?;
    ensure_len(answers.len(), vectors.len(), "embeddings")?;

    vectors
        .iter()
        .map(|vector| {
            if vector.len() != query_embedding.len() {
                return Err(RetrievalError::RerankBackend(format!(
                    "answer embedding has dimension {}, query has {}",
                    vector.len(),
                    query_embedding.len()
                )));
            }
            Ok(cosine_similarity(query_embedding, vector))
        })
        .collect()
}
