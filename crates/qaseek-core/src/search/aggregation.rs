//! Document-level aggregation of chunk hits.
//!
//! Groups chunk hits by their parent document. Each document keeps the best
//! chunk score (max aggregation) and a bounded list of its best chunk
//! previews. A document is relevant if it contains at least one highly
//! relevant passage, so the best chunk represents it.

use super::types::{AggregatedDocument, ChunkHit, ChunkPreview, TopChunks};
use crate::corpus::DocumentId;
use std::collections::HashMap;

/// Aggregated documents in first-seen order.
///
/// Behaves like an insertion-ordered map from document id to
/// [`AggregatedDocument`]. The insertion order is what
/// [`select_candidates`](super::select_candidates) uses to break score ties.
#[derive(Debug, Clone, Default)]
pub struct DocumentAggregation {
    documents: Vec<AggregatedDocument>,
    positions: HashMap<DocumentId, usize>,
}

impl DocumentAggregation {
    /// Looks up a document's aggregate.
    pub fn get(&self, document_id: DocumentId) -> Option<&AggregatedDocument> {
        self.positions
            .get(&document_id)
            .and_then(|&position| self.documents.get(position))
    }

    /// Iterates aggregates in the order their documents were first seen.
    pub fn iter(&self) -> std::slice::Iter<'_, AggregatedDocument> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn record(&mut self, hit: &ChunkHit<'_>) {
        let position = match self.positions.get(&hit.document_id) {
            Some(&position) => position,
            None => {
                self.documents.push(AggregatedDocument {
                    document_id: hit.document_id,
                    best_score: f32::NEG_INFINITY,
                    top_chunks: TopChunks::new(),
                });
                let position = self.documents.len() - 1;
                self.positions.insert(hit.document_id, position);
                position
            }
        };

        let entry = &mut self.documents[position];
        entry.best_score = entry.best_score.max(hit.score);
        entry
            .top_chunks
            .offer(ChunkPreview::new(hit.score, hit.preview_text));
    }
}

/// Aggregates chunk hits into per-document summaries.
///
/// Streams over `hits` in order; for each hit the document's best score is
/// raised to the hit's score if higher, and the hit's preview is offered to
/// the document's bounded top-3 list. The result does not depend on the order
/// of hits within a document, and documents with no hits are simply absent.
///
/// # Examples
///
/// ```ignore
/// let hits = search::search(&query, &corpus, 50)?;
/// let aggregation = aggregate(&hits);
/// // aggregation.get(doc).best_score == highest hit score for doc
/// ```
pub fn aggregate(hits: &[ChunkHit<'_>]) -> DocumentAggregation {
    let mut aggregation = DocumentAggregation::default();
    for hit in hits {
        aggregation.record(hit);
    }
    aggregation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::ChunkId;

    fn hit(chunk: u64, doc: u64, score: f32, text: &'static str) -> ChunkHit<'static> {
        ChunkHit {
            chunk_id: ChunkId::from_u64(chunk),
            document_id: DocumentId::from_u64(doc),
            score,
            preview_text: text,
        }
    }

    #[test]
    fn test_aggregate_groups_by_document() {
        let hits = vec![
            hit(0, 1, 0.9, "best of one"),
            hit(1, 2, 0.8, "only of two"),
            hit(2, 1, 0.7, "second of one"),
        ];

        let aggregation = aggregate(&hits);

        assert_eq!(aggregation.len(), 2);
        let one = aggregation.get(DocumentId::from_u64(1)).unwrap();
        assert_eq!(one.best_score, 0.9);
        assert_eq!(one.top_chunks.len(), 2);
        assert_eq!(one.top_chunks.as_slice()[0].text, "best of one");

        let two = aggregation.get(DocumentId::from_u64(2)).unwrap();
        assert_eq!(two.best_score, 0.8);
        assert_eq!(two.top_chunks.len(), 1);
    }

    #[test]
    fn test_top_chunks_capped_and_sorted_regardless_of_order() {
        let forward = vec![
            hit(0, 1, 0.1, "a"),
            hit(1, 1, 0.4, "b"),
            hit(2, 1, 0.3, "c"),
            hit(3, 1, 0.9, "d"),
            hit(4, 1, 0.2, "e"),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        for hits in [forward, backward] {
            let aggregation = aggregate(&hits);
            let doc = aggregation.get(DocumentId::from_u64(1)).unwrap();
            let scores: Vec<f32> = doc.top_chunks.as_slice().iter().map(|p| p.score).collect();

            assert_eq!(scores, vec![0.9, 0.4, 0.3]);
            assert_eq!(doc.best_score, 0.9);
        }
    }

    #[test]
    fn test_negative_scores_are_kept() {
        let hits = vec![hit(0, 5, -0.3, "x"), hit(1, 5, -0.6, "y")];

        let aggregation = aggregate(&hits);

        assert_eq!(aggregation.get(DocumentId::from_u64(5)).unwrap().best_score, -0.3);
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let hits = vec![hit(0, 7, 0.5, "x"), hit(1, 3, 0.9, "y"), hit(2, 7, 0.95, "z")];

        let aggregation = aggregate(&hits);
        let order: Vec<u64> = aggregation.iter().map(|d| d.document_id.as_u64()).collect();

        assert_eq!(order, vec![7, 3]);
    }

    #[test]
    fn test_empty_input_returns_empty() {
        let aggregation = aggregate(&[]);
        assert!(aggregation.is_empty());
        assert!(aggregation.get(DocumentId::from_u64(0)).is_none());
    }
}
