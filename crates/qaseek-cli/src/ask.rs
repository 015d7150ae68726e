//! Ask command implementation.
//!
//! Loads the knowledge base, runs the question through the retrieval
//! pipeline and optionally synthesizes an answer from the ranked sources.

use crate::backends::BackendArgs;
use crate::config::{self, DataFiles};
use crate::flags::parse_question_flags;
use crate::qa_log;
use anyhow::{anyhow, Context, Result};
use qaseek_core::corpus::KnowledgeBase;
use qaseek_core::query::{QueryOutcome, QueryPipeline};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything the output layer needs for one answered question.
#[derive(Debug, Clone)]
pub struct AskReport {
    pub rag: bool,
    /// Generated answer, present only when RAG was requested
    pub answer: Option<String>,
    pub show_scores: bool,
    pub outcome: QueryOutcome,
}

/// Answers a question against the existing index.
///
/// `raw_question` may carry inline flags (`-s`, `-ce`, `-1`..`-3`). Both the
/// knowledge base load and the query run on blocking threads; the HTTP
/// clients are created and dropped there as well.
pub async fn execute_ask(
    raw_question: &str,
    rag: bool,
    backend: &BackendArgs,
    data_dir: Option<&PathBuf>,
) -> Result<AskReport> {
    let (question, options) = parse_question_flags(raw_question);
    if question.is_empty() {
        return Err(anyhow!("Question is empty after removing flags"));
    }

    let data_dir = config::get_data_dir(data_dir)?;
    let files = DataFiles::new(&data_dir, &backend.embed_model);
    files.ensure_index_exists()?;

    info!("Loading index from {}", data_dir.display());
    let kb = {
        let files = files.clone();
        tokio::task::spawn_blocking(move || KnowledgeBase::open(&files.documents, &files.chunks))
            .await
            .context("Index loading task panicked")?
            .context("Failed to load index")?
    };
    let kb = Arc::new(kb);
    info!(
        "Loaded {} documents, {} chunks",
        kb.documents.len(),
        kb.corpus.len()
    );

    let backend = backend.clone();
    tokio::task::spawn_blocking(move || -> Result<AskReport> {
        let mut pipeline = QueryPipeline::new(kb, Arc::new(backend.embedder()?));
        if let Some(scorer) = backend.scorer()? {
            pipeline = pipeline.with_scorer(Arc::new(scorer));
        }

        let outcome = pipeline.run(&question, &options)?;

        let answer = if rag {
            let generator = backend
                .generator()?
                .ok_or_else(|| anyhow!("--rag needs a generation server (--generate-url)"))?;
            let instruction = config::load_instruction(&files.prompt)?;
            Some(pipeline.synthesize(&outcome, &generator, &instruction)?)
        } else {
            None
        };

        if let Err(e) = qa_log::append_answer(&files.log, &question, answer.as_deref()) {
            warn!("Failed to write question log: {:#}", e);
        }

        Ok(AskReport {
            rag,
            answer,
            show_scores: options.show_scores,
            outcome,
        })
    })
    .await
    .context("Query task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        backend: BackendArgs,
    }

    fn backend() -> BackendArgs {
        TestCli::parse_from(["qs"]).backend
    }

    #[tokio::test]
    async fn test_ask_missing_index() {
        let result = execute_ask(
            "how do I reset my password",
            false,
            &backend(),
            Some(&PathBuf::from("/nonexistent/path")),
        )
        .await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("No index found"));
    }

    #[tokio::test]
    async fn test_ask_only_flags() {
        let result = execute_ask("-s -ce -2", false, &backend(), None).await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Question is empty"));
    }
}
