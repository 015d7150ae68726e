use super::ensure_len;
use crate::backend::PairScorer;
use crate::error::RetrievalError;

/// Scores `(question, answer)` pairs in a single batch.
pub(super) fn score_answers(
    scorer: &dyn PairScorer,
    question: &str,
    answers: &[&str],
) -> Result<Vec<f32>, RetrievalError> {
    let pairs: Vec<(&str, &str)> = answers.iter().map(|&answer| (question, answer)).collect();

    let scores = scorer
        .score_pairs(&pairs)
        .map_err(|e| RetrievalError::RerankBackend(e.to_string()))?;
    ensure_len(pairs.len(), scores.len(), "scores")?;

    Ok(scores)
}
