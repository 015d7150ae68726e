//! Second-stage reranking of candidate documents.
//!
//! Two interchangeable strategies re-score a small candidate set with a more
//! expensive signal and re-truncate it:
//!
//! - **Embedding**: embeds each candidate's full answer text and scores it by
//!   cosine similarity to the query embedding. Scores lie in [-1, 1].
//! - **Cross-encoder**: scores `(question, answer)` pairs jointly. Scores are
//!   an unbounded relevance signal.
//!
//! The two score scales are not comparable. Every [`RankedList`] carries the
//! [`ScoreKind`] of the strategy that produced it, and a list only ever
//! holds scores from one strategy.
//!
//! Neither strategy invents candidates: output ids are a subset of the input
//! ids and the output is at most `top_k` long. Backend failures surface as
//! [`RetrievalError::RerankBackend`]; there is no fallback to the un-reranked
//! order.

mod cross_encoder;
mod embedding;

use crate::backend::{PairScorer, TextEmbedder};
use crate::corpus::{DocumentId, DocumentTable};
use crate::error::RetrievalError;
use crate::search::types::{score_order, Candidate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Reranking strategy selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RerankStrategy {
    /// Cosine similarity between the query and each full answer embedding
    #[default]
    Embedding,
    /// Joint (question, answer) relevance scoring
    CrossEncoder,
}

impl RerankStrategy {
    /// The score semantics this strategy produces.
    pub fn score_kind(self) -> ScoreKind {
        match self {
            RerankStrategy::Embedding => ScoreKind::Cosine,
            RerankStrategy::CrossEncoder => ScoreKind::Relevance,
        }
    }
}

impl fmt::Display for RerankStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RerankStrategy::Embedding => f.write_str("embedding"),
            RerankStrategy::CrossEncoder => f.write_str("cross-encoder"),
        }
    }
}

impl FromStr for RerankStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "embedding" | "embed" => Ok(RerankStrategy::Embedding),
            "cross-encoder" | "cross_encoder" | "ce" => Ok(RerankStrategy::CrossEncoder),
            other => Err(format!("unknown rerank strategy: {}", other)),
        }
    }
}

/// Meaning of the scores in a [`RankedList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreKind {
    /// Cosine similarity in [-1, 1]
    Cosine,
    /// Unbounded cross-encoder relevance logit
    Relevance,
}

impl fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreKind::Cosine => f.write_str("cosine"),
            ScoreKind::Relevance => f.write_str("relevance"),
        }
    }
}

/// A candidate after reranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedResult {
    pub document_id: DocumentId,
    /// Score under the producing strategy's [`ScoreKind`]
    pub score: f32,
}

/// Reranked results from a single strategy, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedList {
    kind: ScoreKind,
    results: Vec<RankedResult>,
}

impl RankedList {
    /// Score semantics of every entry in this list.
    pub fn kind(&self) -> ScoreKind {
        self.kind
    }

    pub fn results(&self) -> &[RankedResult] {
        &self.results
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Query-side inputs shared by both strategies.
#[derive(Debug, Clone, Copy)]
pub struct RerankQuery<'q> {
    /// Question as received (cross-encoder input)
    pub question: &'q str,
    /// Query embedding (embedding-rerank input)
    pub query_embedding: &'q [f32],
}

/// A reranking strategy bound to its backend.
#[derive(Clone, Copy)]
pub enum Reranker<'a> {
    Embedding(&'a dyn TextEmbedder),
    CrossEncoder(&'a dyn PairScorer),
}

impl fmt::Debug for Reranker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reranker::Embedding(embedder) => f
                .debug_tuple("Embedding")
                .field(&embedder.model_id())
                .finish(),
            Reranker::CrossEncoder(scorer) => f
                .debug_tuple("CrossEncoder")
                .field(&scorer.model_id())
                .finish(),
        }
    }
}

impl Reranker<'_> {
    pub fn strategy(&self) -> RerankStrategy {
        match self {
            Reranker::Embedding(_) => RerankStrategy::Embedding,
            Reranker::CrossEncoder(_) => RerankStrategy::CrossEncoder,
        }
    }

    /// Re-scores `candidates`, sorts them descending and keeps `top_k`.
    ///
    /// Full answer texts are resolved through `documents` before any backend
    /// call. Equal scores keep candidate order.
    ///
    /// # Errors
    ///
    /// - `RetrievalError::UnknownDocument` if a candidate is not in `documents`
    /// - `RetrievalError::RerankBackend` if the backend fails, returns the
    ///   wrong number of results or a non-finite score
    #[instrument(skip_all, fields(strategy = %self.strategy(), candidates = candidates.len(), top_k = top_k))]
    pub fn rerank(
        &self,
        candidates: &[Candidate],
        query: &RerankQuery<'_>,
        top_k: usize,
        documents: &DocumentTable,
    ) -> Result<RankedList, RetrievalError> {
        let results = if candidates.is_empty() || top_k == 0 {
            Vec::new()
        } else {
            let answers = answer_texts(candidates, documents)?;
            let scores = match self {
                Reranker::Embedding(embedder) => {
                    embedding::score_answers(*embedder, query.query_embedding, &answers)?
                }
                Reranker::CrossEncoder(scorer) => {
                    cross_encoder::score_answers(*scorer, query.question, &answers)?
                }
            };
            ensure_finite(&scores)?;
            rank(candidates, &scores, top_k)
        };

        debug!(kept = results.len(), "rerank complete");
        Ok(RankedList {
            kind: self.strategy().score_kind(),
            results,
        })
    }
}

/// Resolves the full answer text of every candidate.
fn answer_texts<'d>(
    candidates: &[Candidate],
    documents: &'d DocumentTable,
) -> Result<Vec<&'d str>, RetrievalError> {
    candidates
        .iter()
        .map(|candidate| {
            documents
                .lookup(candidate.document_id)
                .map(|doc| doc.answer_text.as_str())
        })
        .collect()
}

/// Pairs candidates with their new scores, sorts descending (stable) and
/// truncates. `scores` has already been checked to match `candidates`.
fn rank(candidates: &[Candidate], scores: &[f32], top_k: usize) -> Vec<RankedResult> {
    let mut results: Vec<RankedResult> = candidates
        .iter()
        .zip(scores)
        .map(|(candidate, &score)| RankedResult {
            document_id: candidate.document_id,
            score,
        })
        .collect();

    results.sort_by(|a, b| score_order(a.score, b.score));
    results.truncate(top_k);
    results
}

/// Checks a backend returned exactly one result per candidate.
fn ensure_len(expected: usize, actual: usize, what: &str) -> Result<(), RetrievalError> {
    if expected == actual {
        Ok(())
    } else {
        Err(RetrievalError::RerankBackend(format!(
            "backend returned {} {} for {} candidates",
            actual, what, expected
        )))
    }
}

/// Rejects NaN and infinite scores, which would otherwise sort first.
fn ensure_finite(scores: &[f32]) -> Result<(), RetrievalError> {
    match scores.iter().position(|score| !score.is_finite()) {
        None => Ok(()),
        Some(position) => Err(RetrievalError::RerankBackend(format!(
            "backend returned non-finite score {} for candidate {}",
            scores[position], position
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::DocumentRecord;
    use crate::error::BackendError;
    use crate::test_utils::{KeywordEmbedder, ScriptedScorer};

    fn documents() -> DocumentTable {
        let records = [
            (1, "How to reset a password", "reset password settings"),
            (2, "How to delete an account", "delete account support"),
            (3, "How to change email", "email settings change"),
        ]
        .into_iter()
        .map(|(id, question, answer)| DocumentRecord {
            document_id: DocumentId::from_u64(id),
            question_text: question.to_string(),
            answer_text: answer.to_string(),
            link: format!("https://example.com/{}", id),
        })
        .collect();
        DocumentTable::from_records(records).unwrap()
    }

    fn candidates(ids: &[u64]) -> Vec<Candidate> {
        ids.iter()
            .map(|&id| Candidate {
                document_id: DocumentId::from_u64(id),
                score: 0.5,
            })
            .collect()
    }

    fn ids(list: &RankedList) -> Vec<u64> {
        list.iter().map(|r| r.document_id.as_u64()).collect()
    }

    #[test]
    fn test_embedding_rerank_uses_full_answer() {
        let embedder = KeywordEmbedder::new(&["reset", "delete", "email"]);
        let query_embedding = embedder.vector("delete");
        let query = RerankQuery {
            question: "delete",
            query_embedding: &query_embedding,
        };

        let ranked = Reranker::Embedding(&embedder)
            .rerank(&candidates(&[1, 2, 3]), &query, 2, &documents())
            .unwrap();

        assert_eq!(ranked.kind(), ScoreKind::Cosine);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked.results()[0].document_id.as_u64(), 2);
        assert!((ranked.results()[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cross_encoder_rerank_sorts_by_relevance() {
        let scorer = ScriptedScorer::new(vec![-2.0, 7.5, 3.1]);
        let query = RerankQuery {
            question: "anything",
            query_embedding: &[],
        };

        let ranked = Reranker::CrossEncoder(&scorer)
            .rerank(&candidates(&[1, 2, 3]), &query, 3, &documents())
            .unwrap();

        assert_eq!(ranked.kind(), ScoreKind::Relevance);
        assert_eq!(ids(&ranked), vec![2, 3, 1]);
        assert_eq!(ranked.results()[0].score, 7.5);
    }

    #[test]
    fn test_cross_encoder_receives_question_answer_pairs() {
        let scorer = ScriptedScorer::new(vec![1.0, 2.0]);
        let query = RerankQuery {
            question: "my question",
            query_embedding: &[],
        };

        Reranker::CrossEncoder(&scorer)
            .rerank(&candidates(&[3, 1]), &query, 2, &documents())
            .unwrap();

        let seen = scorer.seen_pairs();
        assert_eq!(
            seen,
            vec![
                ("my question".to_string(), "email settings change".to_string()),
                ("my question".to_string(), "reset password settings".to_string()),
            ]
        );
    }

    #[test]
    fn test_short_cross_encoder_response_is_backend_error() {
        let scorer = ScriptedScorer::new(vec![1.0, 2.0]);
        let query = RerankQuery {
            question: "q",
            query_embedding: &[],
        };

        let result =
            Reranker::CrossEncoder(&scorer).rerank(&candidates(&[1, 2, 3]), &query, 3, &documents());

        assert!(matches!(result, Err(RetrievalError::RerankBackend(_))));
    }

    #[test]
    fn test_backend_failure_is_not_swallowed() {
        let scorer = ScriptedScorer::failing(BackendError::RequestFailed("timeout".to_string()));
        let query = RerankQuery {
            question: "q",
            query_embedding: &[],
        };

        let result =
            Reranker::CrossEncoder(&scorer).rerank(&candidates(&[1]), &query, 1, &documents());

        match result {
            Err(RetrievalError::RerankBackend(message)) => assert!(message.contains("timeout")),
            other => panic!("expected RerankBackend, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_score_rejected() {
        let scorer = ScriptedScorer::new(vec![1.0, f32::NAN, 2.0]);
        let query = RerankQuery {
            question: "q",
            query_embedding: &[],
        };

        let result =
            Reranker::CrossEncoder(&scorer).rerank(&candidates(&[1, 2, 3]), &query, 3, &documents());

        match result {
            Err(RetrievalError::RerankBackend(message)) => {
                assert!(message.contains("candidate 1"))
            }
            other => panic!("expected RerankBackend, got {:?}", other),
        }
    }

    #[test]
    fn test_infinite_score_rejected() {
        let scorer = ScriptedScorer::new(vec![f32::INFINITY]);
        let query = RerankQuery {
            question: "q",
            query_embedding: &[],
        };

        let result =
            Reranker::CrossEncoder(&scorer).rerank(&candidates(&[1]), &query, 1, &documents());
        assert!(matches!(result, Err(RetrievalError::RerankBackend(_))));
    }

    #[test]
    fn test_unknown_document_before_backend_call() {
        let scorer = ScriptedScorer::new(vec![1.0, 2.0]);
        let query = RerankQuery {
            question: "q",
            query_embedding: &[],
        };

        let result =
            Reranker::CrossEncoder(&scorer).rerank(&candidates(&[1, 42]), &query, 2, &documents());

        assert!(matches!(result, Err(RetrievalError::UnknownDocument(id)) if id.as_u64() == 42));
        assert!(scorer.seen_pairs().is_empty());
    }

    #[test]
    fn test_empty_candidates_skip_backend() {
        let scorer = ScriptedScorer::failing(BackendError::Unavailable("down".to_string()));
        let query = RerankQuery {
            question: "q",
            query_embedding: &[],
        };

        let ranked = Reranker::CrossEncoder(&scorer)
            .rerank(&[], &query, 3, &documents())
            .unwrap();

        assert!(ranked.is_empty());
        assert_eq!(ranked.kind(), ScoreKind::Relevance);
    }

    #[test]
    fn test_rerank_never_introduces_candidates() {
        let scorer = ScriptedScorer::new(vec![0.3, 0.1]);
        let query = RerankQuery {
            question: "q",
            query_embedding: &[],
        };
        let input = candidates(&[3, 1]);

        let ranked = Reranker::CrossEncoder(&scorer)
            .rerank(&input, &query, 5, &documents())
            .unwrap();

        assert_eq!(ranked.len(), 2);
        for result in ranked.iter() {
            assert!(input.iter().any(|c| c.document_id == result.document_id));
        }
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("ce".parse::<RerankStrategy>().unwrap(), RerankStrategy::CrossEncoder);
        assert_eq!(
            "Embedding".parse::<RerankStrategy>().unwrap(),
            RerankStrategy::Embedding
        );
        assert!("bm25".parse::<RerankStrategy>().is_err());
        assert_eq!(RerankStrategy::CrossEncoder.to_string(), "cross-encoder");
    }
}
