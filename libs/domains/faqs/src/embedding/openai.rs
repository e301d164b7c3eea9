use std::time::Duration;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or, env_required};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::VectorGenerator;
use crate::error::{FaqError, FaqResult};

/// OpenAI embeddings configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub dimension: usize,
    pub timeout: Duration,
}

impl OpenAIConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-large".to_string(),
            dimension: 3072,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_model(mut self, model: String, dimension: usize) -> Self {
        self.model = model;
        self.dimension = dimension;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl FromEnv for OpenAIConfig {
    /// `OPENAI_API_KEY` is required; `OPENAI_BASE_URL`, `OPENAI_EMBEDDING_MODEL`,
    /// `FAQ_EMBEDDING_DIMENSION` and `FAQ_EMBED_TIMEOUT_MS` are optional.
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_required("OPENAI_API_KEY")?;
        let dimension = env_parse_or("FAQ_EMBEDDING_DIMENSION", 3072usize)?;
        let timeout_ms = env_parse_or("FAQ_EMBED_TIMEOUT_MS", 10_000u64)?;

        Ok(Self {
            api_key,
            base_url: env_or_default("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            model: env_or_default("OPENAI_EMBEDDING_MODEL", "text-embedding-3-large"),
            dimension,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

/// Vector generator backed by the OpenAI embeddings API
pub struct OpenAIVectorGenerator {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIVectorGenerator {
    pub fn new(config: OpenAIConfig) -> FaqResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FaqError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> FaqResult<Self> {
        Self::new(OpenAIConfig::from_env()?)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl VectorGenerator for OpenAIVectorGenerator {
    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, text: &str) -> FaqResult<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: vec![text],
            dimensions: self.config.dimension,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(FaqError::EmbeddingFailure(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response.json().await?;

        let vector = embedding_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| FaqError::EmbeddingFailure("No embedding returned".to_string()))?;

        if vector.len() != self.config.dimension {
            return Err(FaqError::EmbeddingFailure(format!(
                "expected {} dimensions, model returned {}",
                self.config.dimension,
                vector.len()
            )));
        }

        Ok(vector)
    }
}
