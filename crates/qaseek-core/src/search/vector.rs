// Brute-force cosine similarity scan over the in-memory corpus

use super::types::{score_order, validate_dimension, ChunkHit};
use crate::corpus::VectorCorpus;
use crate::error::RetrievalError;
use tracing::instrument;

/// Cosine similarity between two vectors of equal length.
///
/// Dot product divided by the product of the L2 norms. Returns 0.0 when
/// either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}

/// Scores every chunk against the query and returns the best `chunk_top_k`.
///
/// Hits are ordered by score descending; equal scores keep corpus order
/// (ascending chunk position). The result length is
/// `min(chunk_top_k, corpus.len())`.
///
/// For small `chunk_top_k` relative to the corpus a partial selection is used
/// before sorting the head; the ordering is a total order, so both paths
/// produce identical output.
///
/// # Errors
///
/// Returns `RetrievalError::DimensionMismatch` if the query dimension differs
/// from the corpus dimension. An empty corpus yields no hits.
#[instrument(skip_all, fields(corpus_size = corpus.len(), chunk_top_k = chunk_top_k))]
pub fn search<'c>(
    query_embedding: &[f32],
    corpus: &'c VectorCorpus,
    chunk_top_k: usize,
) -> Result<Vec<ChunkHit<'c>>, RetrievalError> {
    if corpus.is_empty() {
        return Ok(Vec::new());
    }
    validate_dimension(corpus.dimension(), query_embedding.len())?;

    let mut scored: Vec<(usize, f32)> = corpus
        .iter()
        .enumerate()
        .map(|(position, chunk)| (position, cosine_similarity(query_embedding, &chunk.embedding)))
        .collect();

    let by_rank = |a: &(usize, f32), b: &(usize, f32)| score_order(a.1, b.1).then(a.0.cmp(&b.0));

    let k = chunk_top_k.min(scored.len());
    if k == 0 {
        return Ok(Vec::new());
    }
    if k < scored.len() {
        scored.select_nth_unstable_by(k - 1, by_rank);
        scored.truncate(k);
    }
    scored.sort_by(by_rank);

    Ok(scored
        .into_iter()
        .filter_map(|(position, score)| {
            corpus.get(position).map(|chunk| ChunkHit {
                chunk_id: chunk.chunk_id,
                document_id: chunk.document_id,
                score,
                preview_text: &chunk.preview_text,
            })
        })
        .collect())
}
