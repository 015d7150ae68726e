//! HTTP model backends.
//!
//! Blocking clients for OpenAI-compatible servers:
//! - `POST {embed_url}/embeddings` - `{model, input: [..]}` → `{data: [{index, embedding}]}`
//! - `POST {rerank_url}/rerank` - `{model, pairs: [[question, answer]]}` → `{scores: [..]}`
//! - `POST {generate_url}/completions` - `{model, prompt, ..}` → `{choices: [{text}]}`
//!
//! The clients are blocking and must be created, used and dropped on a
//! blocking thread (see `tokio::task::spawn_blocking`).

use anyhow::{Context, Result};
use clap::Args;
use qaseek_core::backend::{AnswerGenerator, PairScorer, TextEmbedder};
use qaseek_core::config::{DEFAULT_EMBEDDING_MODEL, DEFAULT_RERANK_MODEL};
use qaseek_core::error::BackendError;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Completion length limit for answer synthesis
const GENERATION_MAX_TOKENS: usize = 100;

/// Sampling temperature for answer synthesis
const GENERATION_TEMPERATURE: f32 = 0.2;

/// Nucleus sampling cutoff for answer synthesis
const GENERATION_TOP_P: f32 = 0.5;

/// Default generation model
const DEFAULT_GENERATION_MODEL: &str = "qwen2.5-1.5b-instruct";

/// Model server options shared by every subcommand.
///
/// Every option is global so it may follow the subcommand name.
#[derive(Args, Debug, Clone)]
pub struct BackendArgs {
    /// Base URL of the embedding server
    #[arg(long, global = true, env = "QASEEK_EMBED_URL", default_value = "http://localhost:8080/v1")]
    pub embed_url: String,

    /// Embedding model id (also selects the data files)
    #[arg(long, global = true, env = "QASEEK_EMBED_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    pub embed_model: String,

    /// Base URL of the cross-encoder server (enables `-ce`)
    #[arg(long, global = true, env = "QASEEK_RERANK_URL")]
    pub rerank_url: Option<String>,

    /// Cross-encoder model id
    #[arg(long, global = true, env = "QASEEK_RERANK_MODEL", default_value = DEFAULT_RERANK_MODEL)]
    pub rerank_model: String,

    /// Base URL of the text generation server (required for --rag)
    #[arg(long, global = true, env = "QASEEK_GENERATE_URL")]
    pub generate_url: Option<String>,

    /// Generation model id
    #[arg(long, global = true, env = "QASEEK_GENERATE_MODEL", default_value = DEFAULT_GENERATION_MODEL)]
    pub generate_model: String,

    /// Bearer token sent to every server
    #[arg(long, global = true, env = "QASEEK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "60")]
    pub timeout_secs: u64,
}

impl BackendArgs {
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn embedder(&self) -> Result<HttpEmbedder> {
        HttpEmbedder::new(
            &self.embed_url,
            &self.embed_model,
            self.api_key.as_deref(),
            self.timeout(),
        )
    }

    /// The cross-encoder client, if a rerank server is configured.
    pub fn scorer(&self) -> Result<Option<HttpPairScorer>> {
        self.rerank_url
            .as_deref()
            .map(|url| {
                HttpPairScorer::new(url, &self.rerank_model, self.api_key.as_deref(), self.timeout())
            })
            .transpose()
    }

    /// The generation client, if a generation server is configured.
    pub fn generator(&self) -> Result<Option<HttpGenerator>> {
        self.generate_url
            .as_deref()
            .map(|url| {
                HttpGenerator::new(
                    url,
                    &self.generate_model,
                    self.api_key.as_deref(),
                    self.timeout(),
                )
            })
            .transpose()
    }
}

fn build_client(api_key: Option<&str>, timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    if let Some(key) = api_key.map(str::trim).filter(|key| !key.is_empty()) {
        let auth = format!("Bearer {}", key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).context("invalid API key")?,
        );
    }
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .context("failed to build HTTP client")
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

fn post_json<Req, Resp>(client: &Client, url: &str, body: &Req) -> Result<Resp, BackendError>
where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let resp = client
        .post(url)
        .json(body)
        .send()
        .map_err(|e| BackendError::RequestFailed(format!("{}: {}", url, e)))?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp
            .text()
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        return Err(BackendError::RequestFailed(format!(
            "{} returned {}: {}",
            url, status, text
        )));
    }

    resp.json()
        .map_err(|e| BackendError::InvalidResponse(format!("{}: {}", url, e)))
}

// =============================================================================
// Embeddings
// =============================================================================

/// Embedding client for OpenAI-compatible `/embeddings` endpoints.
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
}

impl HttpEmbedder {
    pub fn new(base_url: &str, model: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        anyhow::ensure!(!model.trim().is_empty(), "missing embedding model name");
        Ok(Self {
            client: build_client(api_key, timeout)?,
            endpoint: endpoint(base_url, "embeddings"),
            model: model.to_string(),
        })
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingEntry>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingEntry {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl EmbeddingResponse {
    /// Vectors in input order.
    fn into_vectors(mut self, expected: usize) -> Result<Vec<Vec<f32>>, BackendError> {
        if self.data.len() != expected {
            return Err(BackendError::InvalidResponse(format!(
                "server returned {} embeddings for {} inputs",
                self.data.len(),
                expected
            )));
        }
        self.data.sort_by_key(|entry| entry.index);
        Ok(self.data.into_iter().map(|entry| entry.embedding).collect())
    }
}

impl TextEmbedder for HttpEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, BackendError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };
        let response: EmbeddingResponse = post_json(&self.client, &self.endpoint, &request)?;
        response.into_vectors(texts.len())
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// =============================================================================
// Cross-encoder
// =============================================================================

/// Cross-encoder client for `/rerank` endpoints that score explicit pairs.
pub struct HttpPairScorer {
    client: Client,
    endpoint: String,
    model: String,
}

impl HttpPairScorer {
    pub fn new(base_url: &str, model: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(api_key, timeout)?,
            endpoint: endpoint(base_url, "rerank"),
            model: model.to_string(),
        })
    }
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    pairs: Vec<[&'a str; 2]>,
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    scores: Vec<f32>,
}

impl PairScorer for HttpPairScorer {
    fn score_pairs(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, BackendError> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }
        let request = RerankRequest {
            model: &self.model,
            pairs: pairs.iter().map(|&(query, passage)| [query, passage]).collect(),
        };
        let response: RerankResponse = post_json(&self.client, &self.endpoint, &request)?;
        Ok(response.scores)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// =============================================================================
// Generation
// =============================================================================

/// Completion client for OpenAI-compatible `/completions` endpoints.
pub struct HttpGenerator {
    client: Client,
    endpoint: String,
    model: String,
}

impl HttpGenerator {
    pub fn new(base_url: &str, model: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(api_key, timeout)?,
            endpoint: endpoint(base_url, "completions"),
            model: model.to_string(),
        })
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: usize,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

impl AnswerGenerator for HttpGenerator {
    fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: GENERATION_MAX_TOKENS,
            temperature: GENERATION_TEMPERATURE,
            top_p: GENERATION_TOP_P,
        };
        let response: CompletionResponse = post_json(&self.client, &self.endpoint, &request)?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| BackendError::InvalidResponse("completion has no choices".to_string()))
    }
}
