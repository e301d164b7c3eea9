use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AvailabilityTracker, IndexAvailability, IndexStore};
use crate::error::{FaqError, FaqResult};
use crate::models::IndexDocument;

type Collection = HashMap<String, IndexDocument>;

/// In-memory index store (for development/testing)
#[derive(Clone)]
pub struct InMemoryIndexStore {
    collections: Arc<RwLock<HashMap<Uuid, Collection>>>,
    online: Arc<AtomicBool>,
    tracker: Arc<AvailabilityTracker>,
}

impl Default for InMemoryIndexStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIndexStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            online: Arc::new(AtomicBool::new(true)),
            tracker: Arc::new(AvailabilityTracker::new("memory")),
        }
    }

    /// Simulate the store going down or coming back
    pub fn set_available(&self, available: bool) {
        self.online.store(available, Ordering::Release);
    }

    pub async fn document(&self, chatbot_id: Uuid, faq_id: &str) -> Option<IndexDocument> {
        let collections = self.collections.read().await;
        collections
            .get(&chatbot_id)
            .and_then(|c| c.get(faq_id))
            .cloned()
    }

    pub async fn document_count(&self, chatbot_id: Uuid) -> usize {
        let collections = self.collections.read().await;
        collections.get(&chatbot_id).map_or(0, |c| c.len())
    }

    fn ensure_online(&self) -> FaqResult<()> {
        if self.online.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(FaqError::Index("in-memory index is offline".to_string()))
        }
    }
}

#[async_trait]
impl IndexStore for InMemoryIndexStore {
    async fn is_available(&self) -> bool {
        let state = if self.online.load(Ordering::Acquire) {
            IndexAvailability::Available
        } else {
            IndexAvailability::Unavailable
        };
        self.tracker.observe(state).is_available()
    }

    async fn collection_exists(&self, chatbot_id: Uuid) -> FaqResult<bool> {
        self.ensure_online()?;
        Ok(self.collections.read().await.contains_key(&chatbot_id))
    }

    async fn ensure_collection(&self, chatbot_id: Uuid, _dimension: usize) -> FaqResult<()> {
        self.ensure_online()?;
        self.collections
            .write()
            .await
            .entry(chatbot_id)
            .or_default();
        Ok(())
    }

    async fn upsert(&self, chatbot_id: Uuid, document: IndexDocument) -> FaqResult<bool> {
        self.ensure_online()?;
        let mut collections = self.collections.write().await;
        let Some(collection) = collections.get_mut(&chatbot_id) else {
            return Err(FaqError::Index(format!(
                "collection for chatbot {} does not exist",
                chatbot_id
            )));
        };
        collection.insert(document.id.clone(), document);
        Ok(true)
    }

    async fn delete(&self, chatbot_id: Uuid, faq_id: &str) -> FaqResult<bool> {
        self.ensure_online()?;
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(&chatbot_id)
            .is_some_and(|c| c.remove(faq_id).is_some()))
    }
}
