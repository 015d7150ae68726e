use super::aggregation::DocumentAggregation;
use super::types::{score_order, Candidate};

/// Picks the `top_k` best aggregated documents as rerank candidates.
///
/// Sorted by `best_score` descending. The sort is stable over the
/// aggregation's first-seen order, so equal scores are won by the document
/// encountered first in the scan. `top_k == 0` yields no candidates.
pub fn select_candidates(aggregation: &DocumentAggregation, top_k: usize) -> Vec<Candidate> {
    if top_k == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<Candidate> = aggregation
        .iter()
        .map(|doc| Candidate {
            document_id: doc.document_id,
            score: doc.best_score,
        })
        .collect();

    candidates.sort_by(|a, b| score_order(a.score, b.score));
    candidates.truncate(top_k);
    candidates
}
