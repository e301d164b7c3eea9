use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse_or};
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, DeletePointsBuilder, Distance, PointId, PointStruct, UpdateStatus,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use uuid::Uuid;

use super::{AvailabilityTracker, IndexAvailability, IndexStore};
use crate::error::{FaqError, FaqResult};
use crate::models::IndexDocument;

/// Qdrant connection configuration
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Prefix of the per-chatbot collection name
    pub collection_prefix: String,
}

impl QdrantConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_collection_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.collection_prefix = prefix.into();
        self
    }
}

impl FromEnv for QdrantConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = env_parse_or("QDRANT_TIMEOUT_SECS", 30u64)?;

        Ok(Self {
            url: env_or_default("QDRANT_URL", "http://localhost:6334"),
            api_key: env_optional("QDRANT_API_KEY"),
            timeout_secs,
            collection_prefix: env_or_default("FAQ_COLLECTION_PREFIX", "faq_"),
        })
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            timeout_secs: 30,
            collection_prefix: "faq_".to_string(),
        }
    }
}

/// Qdrant-backed index store
///
/// FAQ ids are free-form strings while Qdrant only accepts UUID or integer
/// point ids, so each point is keyed by the UUIDv5 of its FAQ id and the FAQ
/// id itself travels in the payload.
pub struct QdrantIndexStore {
    client: Qdrant,
    collection_prefix: String,
    tracker: AvailabilityTracker,
}

impl QdrantIndexStore {
    pub fn new(config: QdrantConfig) -> FaqResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| FaqError::Index(format!("Failed to build client: {}", e)))?;

        Ok(Self::from_client(client, config.collection_prefix))
    }

    pub fn from_client(client: Qdrant, collection_prefix: String) -> Self {
        Self {
            client,
            collection_prefix,
            tracker: AvailabilityTracker::new("qdrant"),
        }
    }

    pub fn collection_name(&self, chatbot_id: Uuid) -> String {
        collection_name(&self.collection_prefix, chatbot_id)
    }
}

fn collection_name(prefix: &str, chatbot_id: Uuid) -> String {
    format!("{}{}", prefix, chatbot_id.simple())
}

fn point_id(faq_id: &str) -> PointId {
    PointId::from(Uuid::new_v5(&Uuid::NAMESPACE_OID, faq_id.as_bytes()).to_string())
}

fn document_payload(chatbot_id: Uuid, document: &IndexDocument) -> HashMap<String, QdrantValue> {
    HashMap::from([
        ("faq_id".to_string(), QdrantValue::from(document.id.clone())),
        (
            "chatbot_id".to_string(),
            QdrantValue::from(chatbot_id.to_string()),
        ),
        (
            "question".to_string(),
            QdrantValue::from(document.question.clone()),
        ),
        (
            "answer".to_string(),
            QdrantValue::from(document.answer.clone()),
        ),
        (
            "synonym".to_string(),
            QdrantValue::from(document.synonym.clone()),
        ),
        (
            "status".to_string(),
            QdrantValue::from(document.status.to_string()),
        ),
    ])
}

#[async_trait]
impl IndexStore for QdrantIndexStore {
    async fn is_available(&self) -> bool {
        let state = match self.client.health_check().await {
            Ok(_) => IndexAvailability::Available,
            Err(e) => {
                tracing::debug!(error = %e, "Qdrant health check failed");
                IndexAvailability::Unavailable
            }
        };
        self.tracker.observe(state).is_available()
    }

    async fn collection_exists(&self, chatbot_id: Uuid) -> FaqResult<bool> {
        let name = self.collection_name(chatbot_id);
        Ok(self.client.collection_exists(&name).await?)
    }

    async fn ensure_collection(&self, chatbot_id: Uuid, dimension: usize) -> FaqResult<()> {
        let name = self.collection_name(chatbot_id);

        if self.client.collection_exists(&name).await? {
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&name)
                    .vectors_config(VectorParamsBuilder::new(dimension as u64, Distance::Cosine)),
            )
            .await?;

        tracing::info!(collection = %name, dimension, "Created index collection");
        Ok(())
    }

    async fn upsert(&self, chatbot_id: Uuid, document: IndexDocument) -> FaqResult<bool> {
        let name = self.collection_name(chatbot_id);
        let payload = document_payload(chatbot_id, &document);
        let point = PointStruct::new(point_id(&document.id), document.vector, payload);

        let response = self
            .client
            .upsert_points(UpsertPointsBuilder::new(&name, vec![point]).wait(true))
            .await?;

        Ok(response
            .result
            .is_some_and(|r| r.status() == UpdateStatus::Completed))
    }

    async fn delete(&self, chatbot_id: Uuid, faq_id: &str) -> FaqResult<bool> {
        let name = self.collection_name(chatbot_id);

        let response = self
            .client
            .delete_points(
                DeletePointsBuilder::new(&name)
                    .points(vec![point_id(faq_id)])
                    .wait(true),
            )
            .await?;

        Ok(response
            .result
            .is_some_and(|r| r.status() == UpdateStatus::Completed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_id_is_stable_per_faq() {
        assert_eq!(point_id("faq_1"), point_id("faq_1"));
        assert_ne!(point_id("faq_1"), point_id("faq_2"));
    }

    #[test]
    fn test_collection_name_is_chatbot_scoped() {
        let chatbot_id = Uuid::nil();
        assert_eq!(
            collection_name("faq_", chatbot_id),
            "faq_00000000000000000000000000000000"
        );
    }

    #[test]
    fn test_config_from_env_defaults() {
        temp_env::with_vars_unset(
            ["QDRANT_URL", "QDRANT_API_KEY", "QDRANT_TIMEOUT_SECS", "FAQ_COLLECTION_PREFIX"],
            || {
                let config = QdrantConfig::from_env().unwrap();
                assert_eq!(config.url, "http://localhost:6334");
                assert_eq!(config.api_key, None);
                assert_eq!(config.timeout_secs, 30);
                assert_eq!(config.collection_prefix, "faq_");
            },
        );
    }
}
