//! Index store: per-chatbot search collections of FAQ documents

mod availability;
mod memory;
mod qdrant;

pub use availability::{AvailabilityTracker, IndexAvailability};
pub use memory::InMemoryIndexStore;
pub use qdrant::{QdrantConfig, QdrantIndexStore};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::FaqResult;
use crate::models::IndexDocument;

/// Search/retrieval store holding one collection per chatbot
///
/// `upsert` and `delete` return `Ok(false)` when the store accepted the call
/// but did not apply the write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Liveness probe, checked before every synchronized write
    async fn is_available(&self) -> bool;

    /// Whether the chatbot's collection has been provisioned
    async fn collection_exists(&self, chatbot_id: Uuid) -> FaqResult<bool>;

    /// Create the chatbot's collection if it is missing
    async fn ensure_collection(&self, chatbot_id: Uuid, dimension: usize) -> FaqResult<()>;

    /// Insert or replace the document keyed by `document.id`
    async fn upsert(&self, chatbot_id: Uuid, document: IndexDocument) -> FaqResult<bool>;

    /// Remove the document of an FAQ
    async fn delete(&self, chatbot_id: Uuid, faq_id: &str) -> FaqResult<bool>;
}
