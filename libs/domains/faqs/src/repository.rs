use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{FaqError, FaqResult};
use crate::models::{FaqRecord, FaqStatus, UpdateFaq};

/// Record store: the system of record for FAQ rows
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FaqRepository: Send + Sync {
    /// Get an FAQ by id
    async fn find_by_id(&self, id: &str) -> FaqResult<Option<FaqRecord>>;

    /// Insert a fully formed record; fails with `DuplicateId` if the id is taken
    async fn create(&self, record: FaqRecord) -> FaqResult<FaqRecord>;

    /// Apply a partial update to an existing record
    async fn update(&self, id: &str, input: UpdateFaq) -> FaqResult<FaqRecord>;

    /// Delete by id, returning whether a row was removed
    async fn delete(&self, id: &str) -> FaqResult<bool>;

    /// Records of a chatbot whose question is one of `questions` (exact match)
    async fn find_many_by_question_in(
        &self,
        chatbot_id: Uuid,
        questions: Vec<String>,
    ) -> FaqResult<Vec<FaqRecord>>;

    /// Number of active records of a chatbot
    async fn count_active(&self, chatbot_id: Uuid) -> FaqResult<u64>;

    /// Bump the hit counter, returning the updated record if it exists
    async fn increment_hit_count(&self, id: &str) -> FaqResult<Option<FaqRecord>>;
}

/// In-memory implementation of FaqRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryFaqRepository {
    faqs: Arc<RwLock<HashMap<String, FaqRecord>>>,
}

impl InMemoryFaqRepository {
    pub fn new() -> Self {
        Self {
            faqs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.faqs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.faqs.read().await.is_empty()
    }
}

#[async_trait]
impl FaqRepository for InMemoryFaqRepository {
    async fn find_by_id(&self, id: &str) -> FaqResult<Option<FaqRecord>> {
        let faqs = self.faqs.read().await;
        Ok(faqs.get(id).cloned())
    }

    async fn create(&self, record: FaqRecord) -> FaqResult<FaqRecord> {
        let mut faqs = self.faqs.write().await;

        if faqs.contains_key(&record.id) {
            return Err(FaqError::DuplicateId(record.id));
        }

        faqs.insert(record.id.clone(), record.clone());

        tracing::debug!(faq_id = %record.id, "Created FAQ record");
        Ok(record)
    }

    async fn update(&self, id: &str, input: UpdateFaq) -> FaqResult<FaqRecord> {
        let mut faqs = self.faqs.write().await;

        let record = faqs
            .get_mut(id)
            .ok_or_else(|| FaqError::NotFound(id.to_string()))?;
        record.apply_update(input);

        tracing::debug!(faq_id = %id, "Updated FAQ record");
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> FaqResult<bool> {
        let mut faqs = self.faqs.write().await;

        if faqs.remove(id).is_some() {
            tracing::debug!(faq_id = %id, "Deleted FAQ record");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn find_many_by_question_in(
        &self,
        chatbot_id: Uuid,
        questions: Vec<String>,
    ) -> FaqResult<Vec<FaqRecord>> {
        let faqs = self.faqs.read().await;
        Ok(faqs
            .values()
            .filter(|f| f.chatbot_id == chatbot_id && questions.contains(&f.question))
            .cloned()
            .collect())
    }

    async fn count_active(&self, chatbot_id: Uuid) -> FaqResult<u64> {
        let faqs = self.faqs.read().await;
        let count = faqs
            .values()
            .filter(|f| f.chatbot_id == chatbot_id && f.status == FaqStatus::Active)
            .count();
        Ok(count as u64)
    }

    async fn increment_hit_count(&self, id: &str) -> FaqResult<Option<FaqRecord>> {
        let mut faqs = self.faqs.write().await;
        Ok(faqs.get_mut(id).map(|record| {
            record.hit_count += 1;
            record.clone()
        }))
    }
}
