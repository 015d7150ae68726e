//! End-to-end query processing.
//!
//! [`QueryPipeline`] runs one question through the whole funnel:
//!
//! ```text
//! question ──► normalize ──► embed ──► search (chunk_top_k)
//!                                          │
//!          compose ◄── rerank (final_top_k) ◄── select (candidate_top_k) ◄── aggregate
//! ```
//!
//! Every stage is synchronous. The pipeline only borrows the shared
//! [`KnowledgeBase`], so one instance can serve concurrent requests from
//! blocking worker threads.

use crate::backend::{AnswerGenerator, PairScorer, TextEmbedder};
use crate::compose::{compose, LinkEntry};
use crate::config::{RetrievalSettings, DEFAULT_FINAL_TOP_K, MAX_FINAL_TOP_K};
use crate::corpus::KnowledgeBase;
use crate::error::RetrievalError;
use crate::generation::{build_prompt, build_sources, trim_to_last_sentence};
use crate::rerank::{RankedList, RerankQuery, RerankStrategy, Reranker};
use crate::search::{aggregate, search, select_candidates};
use crate::text::normalize_text;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Per-request options, already parsed from whatever surface received the
/// question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Second-stage reranking strategy
    pub strategy: RerankStrategy,
    /// Results kept after reranking, capped at `MAX_FINAL_TOP_K`
    pub final_top_k: usize,
    /// Whether the caller wants scores displayed
    pub show_scores: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            strategy: RerankStrategy::default(),
            final_top_k: DEFAULT_FINAL_TOP_K,
            show_scores: false,
        }
    }
}

/// Result of one query.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// The question as received (before normalization)
    pub question: String,
    /// Reranked documents, best first
    pub ranked: RankedList,
    /// One entry per unique link, in ranked order
    pub links: Vec<LinkEntry>,
}

/// Retrieval pipeline over a shared knowledge base.
pub struct QueryPipeline {
    kb: Arc<KnowledgeBase>,
    embedder: Arc<dyn TextEmbedder>,
    scorer: Option<Arc<dyn PairScorer>>,
    settings: RetrievalSettings,
}

impl QueryPipeline {
    /// Creates a pipeline with production funnel sizes and no cross-encoder.
    pub fn new(kb: Arc<KnowledgeBase>, embedder: Arc<dyn TextEmbedder>) -> Self {
        Self {
            kb,
            embedder,
            scorer: None,
            settings: RetrievalSettings::default(),
        }
    }

    /// Enables the cross-encoder strategy.
    pub fn with_scorer(mut self, scorer: Arc<dyn PairScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn with_settings(mut self, settings: RetrievalSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn settings(&self) -> RetrievalSettings {
        self.settings
    }

    /// Answers `question` with a ranked, link-deduplicated result list.
    ///
    /// The normalized question is embedded for the similarity scan; the
    /// cross-encoder sees `question` as given.
    ///
    /// # Errors
    ///
    /// - `StrategyUnavailable` if the cross-encoder is requested but not configured
    /// - `QueryEmbedding` if the embedder fails or does not return exactly one vector
    /// - `DimensionMismatch`, `UnknownDocument`, `RerankBackend` from the stages
    #[instrument(skip_all, fields(strategy = %options.strategy, final_top_k = options.final_top_k))]
    pub fn run(&self, question: &str, options: &QueryOptions) -> Result<QueryOutcome, RetrievalError> {
        let reranker = self.reranker(options.strategy)?;

        let normalized = normalize_text(question);
        let query_embedding = self.embed_query(&normalized)?;

        let hits = search(&query_embedding, &self.kb.corpus, self.settings.chunk_top_k)?;
        let aggregation = aggregate(&hits);
        let candidates = select_candidates(&aggregation, self.settings.candidate_top_k);
        debug!(
            hits = hits.len(),
            documents = aggregation.len(),
            candidates = candidates.len(),
            "candidate funnel"
        );

        let query = RerankQuery {
            question,
            query_embedding: &query_embedding,
        };
        let final_top_k = options.final_top_k.min(MAX_FINAL_TOP_K);
        let ranked = reranker.rerank(&candidates, &query, final_top_k, &self.kb.documents)?;
        let links = compose(&ranked, &self.kb.documents)?;

        info!(results = ranked.len(), links = links.len(), "query complete");
        Ok(QueryOutcome {
            question: question.to_string(),
            ranked,
            links,
        })
    }

    /// Generates a natural-language answer from the ranked sources.
    ///
    /// The completion is cut after its last full sentence.
    ///
    /// # Errors
    ///
    /// `Generation` if the generator fails, `UnknownDocument` if a ranked
    /// document is missing.
    #[instrument(skip_all, fields(sources = outcome.ranked.len()))]
    pub fn synthesize(
        &self,
        outcome: &QueryOutcome,
        generator: &dyn AnswerGenerator,
        instruction: &str,
    ) -> Result<String, RetrievalError> {
        let sources = build_sources(&outcome.ranked, &self.kb.documents)?;
        let prompt = build_prompt(instruction, &outcome.question, &sources);

        let completion = generator
            .generate(&prompt)
            .map_err(|e| RetrievalError::Generation(e.to_string()))?;
        Ok(trim_to_last_sentence(&completion))
    }

    fn reranker(&self, strategy: RerankStrategy) -> Result<Reranker<'_>, RetrievalError> {
        match strategy {
            RerankStrategy::Embedding => Ok(Reranker::Embedding(self.embedder.as_ref())),
            RerankStrategy::CrossEncoder => self
                .scorer
                .as_deref()
                .map(|scorer| Reranker::CrossEncoder(scorer))
                .ok_or(RetrievalError::StrategyUnavailable(strategy)),
        }
    }

    fn embed_query(&self, normalized: &str) -> Result<Vec<f32>, RetrievalError> {
        let mut vectors = self
            .embedder
            .embed(&[normalized])
            .map_err(|e| RetrievalError::QueryEmbedding(e.to_string()))?;

        match vectors.len() {
            1 => Ok(vectors.remove(0)),
            n => Err(RetrievalError::QueryEmbedding(format!(
                "expected 1 query vector, got {}",
                n
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{ChunkId, ChunkRecord, DocumentId, DocumentRecord, DocumentTable, VectorCorpus};
    use crate::error::BackendError;
    use crate::rerank::ScoreKind;
    use crate::test_utils::{EchoGenerator, KeywordEmbedder, ScriptedScorer};

    const VOCABULARY: &[&str] = &["password", "reset", "account", "delete", "email"];

    fn knowledge_base(embedder: &KeywordEmbedder) -> Arc<KnowledgeBase> {
        let docs = [
            (0, "How do I reset my password?", "reset password from settings", "https://x/reset"),
            (1, "How do I delete my account?", "delete account via support", "https://x/delete"),
            (2, "How do I change my email?", "email change in account settings", "https://x/email"),
        ];
        let documents = DocumentTable::from_records(
            docs.iter()
                .map(|&(id, q, a, link)| DocumentRecord {
                    document_id: DocumentId::from_u64(id),
                    question_text: q.to_string(),
                    answer_text: a.to_string(),
                    link: link.to_string(),
                })
                .collect(),
        )
        .unwrap();

        let chunks = docs
            .iter()
            .map(|&(id, q, a, _)| ChunkRecord {
                chunk_id: ChunkId::from_u64(id),
                document_id: DocumentId::from_u64(id),
                embedding: embedder.vector(&format!("{} {}", q, a)),
                preview_text: a.to_string(),
            })
            .collect();

        Arc::new(KnowledgeBase::new(VectorCorpus::load(chunks).unwrap(), documents))
    }

    fn pipeline() -> QueryPipeline {
        let embedder = KeywordEmbedder::new(VOCABULARY);
        let kb = knowledge_base(&embedder);
        QueryPipeline::new(kb, Arc::new(embedder))
    }

    #[test]
    fn test_embedding_strategy_end_to_end() {
        let outcome = pipeline()
            .run("How can I RESET my password?", &QueryOptions::default())
            .unwrap();

        assert_eq!(outcome.ranked.kind(), ScoreKind::Cosine);
        assert_eq!(outcome.ranked.results()[0].document_id.as_u64(), 0);
        assert_eq!(outcome.links[0].link, "https://x/reset");
        assert_eq!(outcome.links[0].label, "How do I reset my password?");
        assert_eq!(outcome.question, "How can I RESET my password?");
    }

    #[test]
    fn test_final_top_k_limits_results() {
        let options = QueryOptions {
            final_top_k: 1,
            ..QueryOptions::default()
        };
        let outcome = pipeline().run("delete account", &options).unwrap();

        assert_eq!(outcome.ranked.len(), 1);
        assert_eq!(outcome.links.len(), 1);
        assert_eq!(outcome.links[0].link, "https://x/delete");
    }

    #[test]
    fn test_final_top_k_capped() {
        let embedder = KeywordEmbedder::new(VOCABULARY);
        let documents = DocumentTable::from_records(
            (0..6)
                .map(|id| DocumentRecord {
                    document_id: DocumentId::from_u64(id),
                    question_text: format!("Reset question {}", id),
                    answer_text: "reset password".to_string(),
                    link: format!("https://x/{}", id),
                })
                .collect(),
        )
        .unwrap();
        let chunks = (0..6)
            .map(|id| ChunkRecord {
                chunk_id: ChunkId::from_u64(id),
                document_id: DocumentId::from_u64(id),
                embedding: embedder.vector("reset password"),
                preview_text: "reset password".to_string(),
            })
            .collect();
        let kb = Arc::new(KnowledgeBase::new(VectorCorpus::load(chunks).unwrap(), documents));
        let pipeline = QueryPipeline::new(kb, Arc::new(embedder)).with_settings(RetrievalSettings {
            chunk_top_k: 50,
            candidate_top_k: 6,
        });
        let options = QueryOptions {
            final_top_k: 6,
            ..QueryOptions::default()
        };

        let outcome = pipeline.run("reset password", &options).unwrap();

        assert_eq!(outcome.ranked.len(), MAX_FINAL_TOP_K);
        assert_eq!(outcome.links.len(), MAX_FINAL_TOP_K);
    }

    #[test]
    fn test_cross_encoder_requires_scorer() {
        let options = QueryOptions {
            strategy: RerankStrategy::CrossEncoder,
            ..QueryOptions::default()
        };

        let result = pipeline().run("reset", &options);
        assert!(matches!(
            result,
            Err(RetrievalError::StrategyUnavailable(RerankStrategy::CrossEncoder))
        ));
    }

    #[test]
    fn test_cross_encoder_sees_unnormalized_question() {
        let scorer = Arc::new(ScriptedScorer::new(vec![0.1, 0.9, 0.5]));
        let pipeline = pipeline()
            .with_scorer(scorer.clone())
            .with_settings(RetrievalSettings {
                chunk_top_k: 50,
                candidate_top_k: 3,
            });
        let options = QueryOptions {
            strategy: RerankStrategy::CrossEncoder,
            ..QueryOptions::default()
        };

        let outcome = pipeline.run("Reset password?", &options).unwrap();

        assert_eq!(outcome.ranked.kind(), ScoreKind::Relevance);
        assert_eq!(outcome.ranked.len(), 3);
        assert!(scorer.seen_pairs().iter().all(|(q, _)| q == "Reset password?"));
        assert_eq!(outcome.ranked.results()[0].score, 0.9);
    }

    #[test]
    fn test_query_embedding_failure() {
        struct Broken;
        impl TextEmbedder for Broken {
            fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, BackendError> {
                Err(BackendError::Unavailable("no model".to_string()))
            }
            fn model_id(&self) -> &str {
                "broken"
            }
        }

        let kb = knowledge_base(&KeywordEmbedder::new(VOCABULARY));
        let pipeline = QueryPipeline::new(kb, Arc::new(Broken));

        let result = pipeline.run("reset", &QueryOptions::default());
        assert!(matches!(result, Err(RetrievalError::QueryEmbedding(_))));
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let kb = knowledge_base(&KeywordEmbedder::new(VOCABULARY));
        let pipeline = QueryPipeline::new(kb, Arc::new(KeywordEmbedder::new(&["reset"])));

        let result = pipeline.run("reset", &QueryOptions::default());
        assert!(matches!(
            result,
            Err(RetrievalError::DimensionMismatch {
                expected: 5,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_synthesize_builds_prompt_and_trims() {
        let pipeline = pipeline();
        let options = QueryOptions {
            final_top_k: 1,
            ..QueryOptions::default()
        };
        let outcome = pipeline.run("reset password", &options).unwrap();
        let generator = EchoGenerator::new("  Go to settings. Then click");

        let answer = pipeline
            .synthesize(&outcome, &generator, "Answer from the sources.")
            .unwrap();

        assert_eq!(answer, "Go to settings.");
        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.starts_with("Answer from the sources.\n\nQuestion: reset password\n"));
        assert!(prompt.contains("Source 0: How do I reset my password?\nreset password from settings\n"));
        assert!(prompt.ends_with("Answer:\n"));
    }

    #[test]
    fn test_generation_failure_surfaces() {
        struct Failing;
        impl AnswerGenerator for Failing {
            fn generate(&self, _prompt: &str) -> Result<String, BackendError> {
                Err(BackendError::RequestFailed("503".to_string()))
            }
        }

        let pipeline = pipeline();
        let outcome = pipeline.run("reset", &QueryOptions::default()).unwrap();

        let result = pipeline.synthesize(&outcome, &Failing, "x");
        assert!(matches!(result, Err(RetrievalError::Generation(_))));
    }
}
