use std::time::Duration;

use core_config::{ConfigError, FromEnv, env_parse_or};

/// Tuning knobs for the synchronizer
#[derive(Debug, Clone)]
pub struct FaqSyncConfig {
    /// Width of every index vector; must match the embedding model output
    pub embedding_dimension: usize,
    /// Value of every component of the fallback vector
    pub fallback_vector_value: f32,
    /// Upper bound on a single embedding call
    pub embed_timeout: Duration,
    /// Budget for one whole create/update/delete
    pub request_timeout: Duration,
    /// How many bulk embeddings run at once
    pub bulk_embed_concurrency: usize,
}

impl FaqSyncConfig {
    pub fn new(embedding_dimension: usize) -> Self {
        Self {
            embedding_dimension,
            ..Default::default()
        }
    }

    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_bulk_embed_concurrency(mut self, concurrency: usize) -> Self {
        self.bulk_embed_concurrency = concurrency.max(1);
        self
    }
}

impl Default for FaqSyncConfig {
    fn default() -> Self {
        Self {
            embedding_dimension: 3072,
            fallback_vector_value: 0.001,
            embed_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            bulk_embed_concurrency: 16,
        }
    }
}

impl FromEnv for FaqSyncConfig {
    /// Environment variables (all optional):
    /// - `FAQ_EMBEDDING_DIMENSION` (default: 3072)
    /// - `FAQ_FALLBACK_VECTOR_VALUE` (default: 0.001)
    /// - `FAQ_EMBED_TIMEOUT_MS` (default: 10000)
    /// - `FAQ_REQUEST_TIMEOUT_MS` (default: 30000)
    /// - `FAQ_BULK_EMBED_CONCURRENCY` (default: 16)
    fn from_env() -> Result<Self, ConfigError> {
        let embedding_dimension = env_parse_or("FAQ_EMBEDDING_DIMENSION", 3072usize)?;
        let fallback_vector_value = env_parse_or("FAQ_FALLBACK_VECTOR_VALUE", 0.001f32)?;
        let embed_timeout_ms = env_parse_or("FAQ_EMBED_TIMEOUT_MS", 10_000u64)?;
        let request_timeout_ms = env_parse_or("FAQ_REQUEST_TIMEOUT_MS", 30_000u64)?;
        let bulk_embed_concurrency = env_parse_or("FAQ_BULK_EMBED_CONCURRENCY", 16usize)?;

        Ok(Self {
            embedding_dimension,
            fallback_vector_value,
            embed_timeout: Duration::from_millis(embed_timeout_ms),
            request_timeout: Duration::from_millis(request_timeout_ms),
            bulk_embed_concurrency: bulk_embed_concurrency.max(1),
        })
    }
}
