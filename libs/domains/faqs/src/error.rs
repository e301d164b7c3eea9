use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaqError {
    #[error("FAQ with id '{0}' already exists")]
    DuplicateId(String),

    #[error("FAQ not found: {0}")]
    NotFound(String),

    #[error("Quota denied: {reason} ({current_count}/{})", max_label(.max_count))]
    QuotaDenied {
        reason: String,
        current_count: u64,
        max_count: Option<u64>,
    },

    #[error("Embedding error: {0}")]
    EmbeddingFailure(String),

    #[error("Index store unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Failed to sync FAQ {id} to the index store: {reason}")]
    SyncFailure { id: String, reason: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Timed out during {0}")]
    Timeout(&'static str),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Index store error: {0}")]
    Index(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn max_label(max: &Option<u64>) -> String {
    match max {
        Some(max) => max.to_string(),
        None => "unlimited".to_string(),
    }
}

pub type FaqResult<T> = Result<T, FaqError>;

impl FaqError {
    /// Infrastructure failures the caller may retry, as opposed to business outcomes.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FaqError::Timeout(_)
                | FaqError::Database(_)
                | FaqError::Index(_)
                | FaqError::IndexUnavailable(_)
                | FaqError::EmbeddingFailure(_)
        )
    }

    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            FaqError::DuplicateId(_) => "duplicate_id",
            FaqError::NotFound(_) => "not_found",
            FaqError::QuotaDenied { .. } => "quota_denied",
            FaqError::EmbeddingFailure(_) => "embedding_failure",
            FaqError::IndexUnavailable(_) => "index_unavailable",
            FaqError::SyncFailure { .. } => "sync_failure",
            FaqError::Validation(_) => "validation",
            FaqError::Timeout(_) => "timeout",
            FaqError::Database(_) => "database",
            FaqError::Index(_) => "index",
            FaqError::Config(_) => "config",
        }
    }
}

impl From<validator::ValidationErrors> for FaqError {
    fn from(err: validator::ValidationErrors) -> Self {
        FaqError::Validation(err.to_string())
    }
}

impl From<sea_orm::DbErr> for FaqError {
    fn from(err: sea_orm::DbErr) -> Self {
        FaqError::Database(err.to_string())
    }
}

impl From<qdrant_client::QdrantError> for FaqError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        FaqError::Index(err.to_string())
    }
}

impl From<reqwest::Error> for FaqError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FaqError::Timeout("embedding request")
        } else {
            FaqError::EmbeddingFailure(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FaqError {
    fn from(err: serde_json::Error) -> Self {
        FaqError::Validation(format!("JSON error: {}", err))
    }
}

impl From<core_config::ConfigError> for FaqError {
    fn from(err: core_config::ConfigError) -> Self {
        FaqError::Config(err.to_string())
    }
}
