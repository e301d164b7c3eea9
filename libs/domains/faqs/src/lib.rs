//! FAQs Domain
//!
//! Keeps chatbot FAQs consistent across two stores: the relational record
//! store (authoritative) and a vector index used for semantic search.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  FaqSyncService  │  ← create/update/delete/bulk, compensation
//! └──┬─────┬─────┬───┘
//!    │     │     │
//!    │     │  ┌──▼────────────┐
//!    │     │  │  QuotaGuard   │  ← plan limits (PlanRepository)
//!    │     │  └───────────────┘
//!    │  ┌──▼────────────┐   ┌─────────────────┐
//!    │  │  IndexStore   │ ← │ VectorGenerator │  ← embeddings
//!    │  └───────────────┘   └─────────────────┘
//! ┌──▼────────────┐
//! │ FaqRepository │  ← record store (sea-orm / in-memory)
//! └───────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_faqs::{
//!     FaqSyncConfig, FaqSyncService, InMemoryFaqRepository, InMemoryIndexStore,
//!     InMemoryPlanRepository, OpenAIConfig, OpenAIVectorGenerator,
//! };
//!
//! # fn main() -> Result<(), domain_faqs::FaqError> {
//! let config = FaqSyncConfig::default();
//! let embedder = OpenAIVectorGenerator::new(OpenAIConfig::new("sk-test".to_string()))?;
//!
//! let service = FaqSyncService::new(
//!     InMemoryFaqRepository::new(),
//!     InMemoryIndexStore::new(),
//!     InMemoryPlanRepository::new(),
//!     Arc::new(embedder),
//!     config,
//! );
//! # Ok(())
//! # }
//! ```

pub mod bulk;
pub mod config;
pub mod embedding;
pub mod entity;
pub mod error;
pub mod index;
pub mod models;
pub mod postgres;
pub mod quota;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use bulk::BulkStage;
pub use config::FaqSyncConfig;
pub use embedding::{OpenAIConfig, OpenAIVectorGenerator, VectorGenerator, fallback_vector};
pub use error::{FaqError, FaqResult};
pub use index::{
    AvailabilityTracker, InMemoryIndexStore, IndexAvailability, IndexStore, QdrantConfig,
    QdrantIndexStore,
};
pub use models::{
    BulkUploadItem, BulkUploadResult, BulkUploadSummary, CreateFaq, FaqRecord, FaqStatus,
    IndexDocument, QuotaDecision, UpdateFaq,
};
pub use postgres::PgFaqRepository;
pub use quota::{
    InMemoryPlanRepository, PgPlanRepository, PlanLimits, PlanLookup, PlanRepository, QuotaGuard,
};
pub use repository::{FaqRepository, InMemoryFaqRepository};
pub use service::FaqSyncService;
