//! Test utilities for qaseek-core.
//!
//! Deterministic in-process stand-ins for the model backends. Only compiled
//! when running tests.

use crate::backend::{AnswerGenerator, PairScorer, TextEmbedder};
use crate::error::BackendError;
use std::sync::Mutex;

/// Embeds text as keyword occurrence counts over a fixed vocabulary.
///
/// Texts sharing keywords get high cosine similarity, texts sharing none get
/// zero.
pub struct KeywordEmbedder {
    vocabulary: Vec<String>,
}

impl KeywordEmbedder {
    pub fn new(vocabulary: &[&str]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        self.vocabulary
            .iter()
            .map(|keyword| {
                lowered
                    .split_whitespace()
                    .filter(|word| word.trim_matches(|c: char| !c.is_alphanumeric()) == keyword)
                    .count() as f32
            })
            .collect()
    }
}

impl TextEmbedder for KeywordEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, BackendError> {
        Ok(texts.iter().map(|text| self.vector(text)).collect())
    }

    fn model_id(&self) -> &str {
        "keyword-test"
    }
}

/// Pair scorer returning a fixed script of scores and recording its input.
pub struct ScriptedScorer {
    outcome: Result<Vec<f32>, BackendError>,
    seen: Mutex<Vec<(String, String)>>,
}

impl ScriptedScorer {
    pub fn new(scores: Vec<f32>) -> Self {
        Self {
            outcome: Ok(scores),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: BackendError) -> Self {
        Self {
            outcome: Err(error),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen_pairs(&self) -> Vec<(String, String)> {
        self.seen.lock().unwrap().clone()
    }
}

impl PairScorer for ScriptedScorer {
    fn score_pairs(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, BackendError> {
        self.seen.lock().unwrap().extend(
            pairs
                .iter()
                .map(|(q, a)| (q.to_string(), a.to_string())),
        );
        self.outcome.clone()
    }

    fn model_id(&self) -> &str {
        "scripted-test"
    }
}

/// Generator that echoes a canned completion and keeps the last prompt.
pub struct EchoGenerator {
    completion: String,
    last_prompt: Mutex<Option<String>>,
}

impl EchoGenerator {
    pub fn new(completion: &str) -> Self {
        Self {
            completion: completion.to_string(),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

impl AnswerGenerator for EchoGenerator {
    fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        Ok(self.completion.clone())
    }
}
