use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use observability::{FaqSyncMetrics, SyncTimer};
use tokio::time::Instant;
use uuid::Uuid;
use validator::Validate;

use crate::config::FaqSyncConfig;
use crate::embedding::{VectorGenerator, fallback_vector};
use crate::error::{FaqError, FaqResult};
use crate::index::IndexStore;
use crate::models::{CreateFaq, FaqRecord, QuotaDecision, UpdateFaq};
use crate::quota::{PlanRepository, QuotaGuard};
use crate::repository::FaqRepository;

pub(crate) const OP_CREATE: &str = "create";
pub(crate) const OP_UPDATE: &str = "update";
pub(crate) const OP_DELETE: &str = "delete";
pub(crate) const OP_REINDEX: &str = "reindex";
pub(crate) const OP_BULK: &str = "bulk_upload";

/// Request-scoped time budget shared by every step of one operation
pub(crate) struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    pub(crate) fn after(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget,
        }
    }

    pub(crate) fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Run a store call, failing with `Timeout(stage)` once the budget is spent
    pub(crate) async fn run<T, F>(&self, stage: &'static str, call: F) -> FaqResult<T>
    where
        F: Future<Output = FaqResult<T>>,
    {
        match tokio::time::timeout_at(self.expires_at, call).await {
            Ok(result) => result,
            Err(_) => Err(FaqError::Timeout(stage)),
        }
    }
}

fn record_outcome<T>(operation: &'static str, result: &FaqResult<T>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    FaqSyncMetrics::record_operation(operation, outcome);
}

pub(crate) fn quota_denied(decision: QuotaDecision) -> FaqError {
    FaqError::QuotaDenied {
        reason: decision
            .reason
            .unwrap_or_else(|| "quota exceeded".to_string()),
        current_count: decision.current_count,
        max_count: decision.max_count,
    }
}

/// Keeps the record store and the index store in step for FAQ mutations
///
/// The record store is authoritative. Create is strict about the index (a
/// failed index write rolls the record back), update and delete are lenient
/// (index failures are logged and the record change stands).
pub struct FaqSyncService<R: FaqRepository, I: IndexStore, P: PlanRepository> {
    pub(crate) records: Arc<R>,
    pub(crate) index: Arc<I>,
    pub(crate) quota: QuotaGuard<P, R>,
    pub(crate) embedder: Arc<dyn VectorGenerator>,
    pub(crate) config: FaqSyncConfig,
}

impl<R: FaqRepository, I: IndexStore, P: PlanRepository> Clone for FaqSyncService<R, I, P> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            index: Arc::clone(&self.index),
            quota: self.quota.clone(),
            embedder: Arc::clone(&self.embedder),
            config: self.config.clone(),
        }
    }
}

impl<R: FaqRepository, I: IndexStore, P: PlanRepository> FaqSyncService<R, I, P> {
    pub fn new(
        records: R,
        index: I,
        plans: P,
        embedder: Arc<dyn VectorGenerator>,
        config: FaqSyncConfig,
    ) -> Self {
        if embedder.dimension() != config.embedding_dimension {
            tracing::warn!(
                generator_dimension = embedder.dimension(),
                index_dimension = config.embedding_dimension,
                "Vector generator and index disagree on dimension, embeddings will fall back"
            );
        }

        let records = Arc::new(records);
        let quota = QuotaGuard::new(Arc::new(plans), Arc::clone(&records));

        Self {
            records,
            index: Arc::new(index),
            quota,
            embedder,
            config,
        }
    }

    pub fn config(&self) -> &FaqSyncConfig {
        &self.config
    }

    /// Create an FAQ in the record store and index it
    ///
    /// If the index store is down the record is still committed and no index
    /// document is written. If the index write fails the record is deleted
    /// again and `SyncFailure` is returned.
    #[tracing::instrument(skip(self, input), fields(chatbot_id = %input.chatbot_id))]
    pub async fn create_faq(&self, input: CreateFaq) -> FaqResult<FaqRecord> {
        let mut timer = SyncTimer::new(OP_CREATE);
        let result = self.create_synced(input).await;
        timer.stop();
        record_outcome(OP_CREATE, &result);
        result
    }

    async fn create_synced(&self, input: CreateFaq) -> FaqResult<FaqRecord> {
        input.validate()?;
        let deadline = Deadline::after(self.config.request_timeout);

        let candidate = FaqRecord::new(input);

        let existing = deadline
            .run("record lookup", self.records.find_by_id(&candidate.id))
            .await?;
        if existing.is_some() {
            return Err(FaqError::DuplicateId(candidate.id));
        }

        let decision = deadline
            .run("quota check", self.quota.check_can_create_faq(candidate.chatbot_id))
            .await?;
        if !decision.allowed {
            return Err(quota_denied(decision));
        }

        let faq_id = candidate.id.clone();
        let record = match deadline
            .run("record write", self.records.create(candidate))
            .await
        {
            Ok(record) => record,
            Err(FaqError::Timeout(stage)) => {
                self.discard_unconfirmed_write(OP_CREATE, &faq_id).await;
                return Err(FaqError::Timeout(stage));
            }
            Err(e) => return Err(e),
        };

        match self.sync_index_document(OP_CREATE, &record, &deadline).await {
            Ok(()) => {
                tracing::info!(faq_id = %record.id, "FAQ created and indexed");
                Ok(record)
            }
            Err(FaqError::IndexUnavailable(_)) => {
                tracing::warn!(
                    faq_id = %record.id,
                    "FAQ committed without index document"
                );
                Ok(record)
            }
            Err(e) => Err(self.compensate_create(&record, e).await),
        }
    }

    /// The insert was cut off by the deadline and may or may not have landed
    pub(crate) async fn discard_unconfirmed_write(&self, operation: &'static str, faq_id: &str) {
        match self.records.delete(faq_id).await {
            Ok(true) => {
                tracing::warn!(faq_id, "Record write timed out after committing, rolled back");
                FaqSyncMetrics::record_rollback(operation);
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!(faq_id, error = %e, "Rollback of timed out record write failed");
                FaqSyncMetrics::record_orphan(operation, faq_id);
            }
        }
    }

    /// Undo the record write of a create whose index write failed
    async fn compensate_create(&self, record: &FaqRecord, cause: FaqError) -> FaqError {
        tracing::warn!(faq_id = %record.id, error = %cause, "Index write failed, rolling back record");

        match self.records.delete(&record.id).await {
            Ok(_) => FaqSyncMetrics::record_rollback(OP_CREATE),
            Err(e) => {
                tracing::error!(faq_id = %record.id, error = %e, "Rollback delete failed");
                FaqSyncMetrics::record_orphan(OP_CREATE, &record.id);
            }
        }

        match cause {
            FaqError::Timeout(_) | FaqError::SyncFailure { .. } => cause,
            other => FaqError::SyncFailure {
                id: record.id.clone(),
                reason: other.to_string(),
            },
        }
    }

    /// Update an FAQ; the record change stands even if re-indexing fails
    #[tracing::instrument(skip(self, input))]
    pub async fn update_faq(&self, id: &str, input: UpdateFaq) -> FaqResult<FaqRecord> {
        let mut timer = SyncTimer::new(OP_UPDATE);
        let result = self.update_synced(id, input).await;
        timer.stop();
        record_outcome(OP_UPDATE, &result);
        result
    }

    async fn update_synced(&self, id: &str, input: UpdateFaq) -> FaqResult<FaqRecord> {
        input.validate()?;
        let deadline = Deadline::after(self.config.request_timeout);

        if deadline
            .run("record lookup", self.records.find_by_id(id))
            .await?
            .is_none()
        {
            return Err(FaqError::NotFound(id.to_string()));
        }

        let record = deadline
            .run("record write", self.records.update(id, input))
            .await?;

        match self.sync_index_document(OP_UPDATE, &record, &deadline).await {
            Ok(()) | Err(FaqError::IndexUnavailable(_)) => {}
            Err(e) => {
                tracing::warn!(faq_id = %record.id, error = %e, "Index refresh failed after update");
            }
        }

        Ok(record)
    }

    /// Delete an FAQ; index-side failures are logged and ignored
    #[tracing::instrument(skip(self))]
    pub async fn delete_faq(&self, id: &str) -> FaqResult<()> {
        let mut timer = SyncTimer::new(OP_DELETE);
        let result = self.delete_synced(id).await;
        timer.stop();
        record_outcome(OP_DELETE, &result);
        result
    }

    async fn delete_synced(&self, id: &str) -> FaqResult<()> {
        let deadline = Deadline::after(self.config.request_timeout);

        let record = deadline
            .run("record lookup", self.records.find_by_id(id))
            .await?
            .ok_or_else(|| FaqError::NotFound(id.to_string()))?;

        let deleted = deadline
            .run("record delete", self.records.delete(id))
            .await?;
        if !deleted {
            return Err(FaqError::NotFound(id.to_string()));
        }

        if !self.index_available(&deadline).await {
            FaqSyncMetrics::record_index_skipped(OP_DELETE);
            return Ok(());
        }

        match deadline
            .run("index delete", self.index.delete(record.chatbot_id, id))
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(faq_id = %id, "Index store did not apply delete");
            }
            Err(e) => {
                tracing::warn!(faq_id = %id, error = %e, "Index delete failed after record delete");
            }
        }

        Ok(())
    }

    /// Get an FAQ by id
    pub async fn get_faq(&self, id: &str) -> FaqResult<FaqRecord> {
        self.records
            .find_by_id(id)
            .await?
            .ok_or_else(|| FaqError::NotFound(id.to_string()))
    }

    /// Bump the hit counter; not synchronized to the index
    pub async fn increment_hit_count(&self, id: &str) -> FaqResult<FaqRecord> {
        self.records
            .increment_hit_count(id)
            .await?
            .ok_or_else(|| FaqError::NotFound(id.to_string()))
    }

    /// Current quota decision for a chatbot
    pub async fn check_quota(&self, chatbot_id: Uuid) -> FaqResult<QuotaDecision> {
        self.quota.check_can_create_faq(chatbot_id).await
    }

    /// Make sure the chatbot's index collection exists
    #[tracing::instrument(skip(self))]
    pub async fn provision_index(&self, chatbot_id: Uuid) -> FaqResult<()> {
        if !self.index.is_available().await {
            return Err(FaqError::IndexUnavailable(
                "cannot provision collection while index store is down".to_string(),
            ));
        }

        self.index
            .ensure_collection(chatbot_id, self.config.embedding_dimension)
            .await
    }

    /// Rewrite the index document of an existing FAQ
    ///
    /// Unlike update, failures are returned to the caller.
    #[tracing::instrument(skip(self))]
    pub async fn reindex_faq(&self, id: &str) -> FaqResult<FaqRecord> {
        let mut timer = SyncTimer::new(OP_REINDEX);
        let result = async {
            let deadline = Deadline::after(self.config.request_timeout);
            let record = deadline
                .run("record lookup", self.records.find_by_id(id))
                .await?
                .ok_or_else(|| FaqError::NotFound(id.to_string()))?;

            self.sync_index_document(OP_REINDEX, &record, &deadline)
                .await?;
            Ok(record)
        }
        .await;
        timer.stop();
        record_outcome(OP_REINDEX, &result);
        result
    }

    /// Embed (with fallback) and upsert the index document of a record
    async fn sync_index_document(
        &self,
        operation: &'static str,
        record: &FaqRecord,
        deadline: &Deadline,
    ) -> FaqResult<()> {
        if !self.index_available(deadline).await {
            FaqSyncMetrics::record_index_skipped(operation);
            return Err(FaqError::IndexUnavailable(
                "index store is not reachable".to_string(),
            ));
        }

        let vector = self
            .vector_or_fallback(operation, record, deadline)
            .await;
        let document = record.to_index_document(vector);

        let applied = deadline
            .run("index write", self.index.upsert(record.chatbot_id, document))
            .await?;
        if !applied {
            return Err(FaqError::SyncFailure {
                id: record.id.clone(),
                reason: "index store did not apply the upsert".to_string(),
            });
        }

        Ok(())
    }

    /// Availability probe bounded by the request budget; a stalled probe counts as down
    async fn index_available(&self, deadline: &Deadline) -> bool {
        tokio::time::timeout(deadline.remaining(), self.index.is_available())
            .await
            .unwrap_or(false)
    }

    async fn vector_or_fallback(
        &self,
        operation: &'static str,
        record: &FaqRecord,
        deadline: &Deadline,
    ) -> Vec<f32> {
        let budget = self.config.embed_timeout.min(deadline.remaining());

        match self.embed(&record.question, budget).await {
            Ok(vector) => vector,
            Err(e) => {
                tracing::warn!(faq_id = %record.id, error = %e, "Embedding failed, using fallback vector");
                FaqSyncMetrics::record_fallback_vector(operation);
                fallback_vector(
                    self.config.embedding_dimension,
                    self.config.fallback_vector_value,
                )
            }
        }
    }

    /// One embedding call bounded by `budget`, checked against the index width
    pub(crate) async fn embed(&self, text: &str, budget: Duration) -> FaqResult<Vec<f32>> {
        let vector = tokio::time::timeout(budget, self.embedder.embed(text))
            .await
            .map_err(|_| FaqError::Timeout("embedding"))??;

        if vector.len() != self.config.embedding_dimension {
            return Err(FaqError::EmbeddingFailure(format!(
                "expected {} dimensions, got {}",
                self.config.embedding_dimension,
                vector.len()
            )));
        }

        Ok(vector)
    }
}
