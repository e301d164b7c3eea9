use std::collections::HashSet;

use futures::{StreamExt, stream};
use observability::{FaqSyncMetrics, SyncTimer};
use strum::Display;
use uuid::Uuid;

use crate::error::{FaqError, FaqResult};
use crate::index::IndexStore;
use crate::models::{
    BulkUploadItem, BulkUploadResult, BulkUploadSummary, CreateFaq, FaqRecord, generate_faq_id,
};
use crate::quota::PlanRepository;
use crate::repository::FaqRepository;
use crate::service::{Deadline, FaqSyncService, OP_BULK, quota_denied};

pub const REASON_DUPLICATE_QUESTION: &str = "question already exists";
pub const REASON_INDEX_WRITE_FAILED: &str = "index write failed";

/// Progress of one bulk upload, reported in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum BulkStage {
    Validating,
    DuplicateFiltering,
    QuotaChecking,
    EmbeddingGeneration,
    RecordWrite,
    IndexPrecondition,
    IndexWrite,
    Aggregating,
    Done,
    AllDuplicates,
    QuotaDenied,
    IndexUnavailableAborted,
}

struct Candidate {
    position: usize,
    item: BulkUploadItem,
}

struct Written {
    position: usize,
    item: BulkUploadItem,
    record: FaqRecord,
    vector: Vec<f32>,
}

fn enter(chatbot_id: Uuid, stage: BulkStage) {
    tracing::debug!(%chatbot_id, %stage, "Bulk upload stage");
}

fn record_for(chatbot_id: Uuid, faq_id: String, item: &BulkUploadItem) -> FaqRecord {
    FaqRecord::new(CreateFaq {
        id: Some(faq_id),
        chatbot_id,
        topic_id: item.topic_id.clone(),
        question: item.question.trim().to_string(),
        answer: item.answer.trim().to_string(),
        synonym: item.synonym.clone().unwrap_or_default(),
        status: item.status.unwrap_or_default(),
        layout: None,
        images: None,
        sort_order: 0,
    })
}

fn failed(item: BulkUploadItem, error: impl Into<String>) -> BulkUploadResult {
    BulkUploadResult::failed(item.question, item.answer, error)
}

impl<R: FaqRepository, I: IndexStore, P: PlanRepository> FaqSyncService<R, I, P> {
    /// Create many FAQs for one chatbot
    ///
    /// Per-item problems (duplicates, blank fields, embedding or write
    /// failures) end up in the summary. Quota denial and an unusable index
    /// store fail the whole batch, the latter after rolling back every record
    /// written so far.
    #[tracing::instrument(skip(self, items), fields(items = items.len()))]
    pub async fn bulk_upload(
        &self,
        chatbot_id: Uuid,
        items: Vec<BulkUploadItem>,
    ) -> FaqResult<BulkUploadSummary> {
        let mut timer = SyncTimer::new(OP_BULK);
        let result = self.run_bulk_upload(chatbot_id, items).await;
        timer.stop();

        match &result {
            Ok(summary) => {
                FaqSyncMetrics::record_operation(OP_BULK, "ok");
                FaqSyncMetrics::record_bulk_items(
                    summary.success_count,
                    summary.skipped_count,
                    summary.failed_count,
                );
            }
            Err(e) => FaqSyncMetrics::record_operation(OP_BULK, e.kind()),
        }

        result
    }

    async fn run_bulk_upload(
        &self,
        chatbot_id: Uuid,
        items: Vec<BulkUploadItem>,
    ) -> FaqResult<BulkUploadSummary> {
        enter(chatbot_id, BulkStage::Validating);
        if items.is_empty() {
            return Err(FaqError::Validation(
                "bulk upload requires at least one item".to_string(),
            ));
        }

        let mut results: Vec<Option<BulkUploadResult>> = vec![None; items.len()];

        enter(chatbot_id, BulkStage::DuplicateFiltering);
        let candidates = self
            .filter_duplicates(chatbot_id, items, &mut results)
            .await?;
        if candidates.is_empty() {
            enter(chatbot_id, BulkStage::AllDuplicates);
            return Ok(BulkUploadSummary::from_results(
                results.into_iter().flatten().collect(),
            ));
        }

        enter(chatbot_id, BulkStage::QuotaChecking);
        if let Err(e) = self.check_batch_quota(chatbot_id, candidates.len()).await {
            enter(chatbot_id, BulkStage::QuotaDenied);
            return Err(e);
        }

        enter(chatbot_id, BulkStage::EmbeddingGeneration);
        let embedded = self.embed_candidates(candidates).await;

        enter(chatbot_id, BulkStage::RecordWrite);
        let mut written = Vec::new();
        for (candidate, outcome) in embedded {
            let (faq_id, vector) = match outcome {
                Ok(embedded) => embedded,
                Err(e) => {
                    results[candidate.position] = Some(failed(candidate.item, e.to_string()));
                    continue;
                }
            };

            let record = record_for(chatbot_id, faq_id.clone(), &candidate.item);
            let deadline = Deadline::after(self.config.request_timeout);
            match deadline.run("record write", self.records.create(record)).await {
                Ok(record) => written.push(Written {
                    position: candidate.position,
                    item: candidate.item,
                    record,
                    vector,
                }),
                Err(e @ FaqError::Timeout(_)) => {
                    self.discard_unconfirmed_write(OP_BULK, &faq_id).await;
                    results[candidate.position] = Some(failed(candidate.item, e.to_string()));
                }
                Err(e) => {
                    tracing::warn!(%chatbot_id, error = %e, "Bulk record write failed");
                    results[candidate.position] =
                        Some(failed(candidate.item, format!("record write failed: {}", e)));
                }
            }
        }

        if !written.is_empty() {
            enter(chatbot_id, BulkStage::IndexPrecondition);
            if let Err(reason) = self.index_ready(chatbot_id).await {
                enter(chatbot_id, BulkStage::IndexUnavailableAborted);
                tracing::error!(
                    %chatbot_id,
                    written = written.len(),
                    reason = %reason,
                    "Index store not ready, aborting bulk upload"
                );
                for entry in &written {
                    self.rollback_record(&entry.record.id).await;
                }
                return Err(FaqError::IndexUnavailable(reason));
            }

            enter(chatbot_id, BulkStage::IndexWrite);
            for entry in written {
                let faq_id = entry.record.id.clone();
                let document = entry.record.to_index_document(entry.vector);

                let deadline = Deadline::after(self.config.request_timeout);
                let outcome = match deadline
                    .run("index write", self.index.upsert(chatbot_id, document))
                    .await
                {
                    Ok(true) => Ok(()),
                    Ok(false) => Err("index store did not apply the upsert".to_string()),
                    Err(e) => Err(e.to_string()),
                };

                results[entry.position] = Some(match outcome {
                    Ok(()) => {
                        BulkUploadResult::succeeded(entry.item.question, entry.item.answer, faq_id)
                    }
                    Err(reason) => {
                        tracing::warn!(faq_id = %faq_id, reason = %reason, "Bulk index write failed");
                        self.rollback_record(&faq_id).await;
                        failed(entry.item, REASON_INDEX_WRITE_FAILED)
                    }
                });
            }
        }

        enter(chatbot_id, BulkStage::Aggregating);
        let summary = BulkUploadSummary::from_results(results.into_iter().flatten().collect());
        enter(chatbot_id, BulkStage::Done);

        Ok(summary)
    }

    /// Mark candidates whose trimmed question already exists as skipped
    async fn filter_duplicates(
        &self,
        chatbot_id: Uuid,
        items: Vec<BulkUploadItem>,
        results: &mut [Option<BulkUploadResult>],
    ) -> FaqResult<Vec<Candidate>> {
        let questions: Vec<String> = items
            .iter()
            .map(|item| item.question.trim().to_string())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let deadline = Deadline::after(self.config.request_timeout);
        let existing: HashSet<String> = deadline
            .run(
                "duplicate lookup",
                self.records.find_many_by_question_in(chatbot_id, questions),
            )
            .await?
            .into_iter()
            .map(|record| record.question)
            .collect();

        let mut candidates = Vec::with_capacity(items.len());
        for (position, item) in items.into_iter().enumerate() {
            if existing.contains(item.question.trim()) {
                results[position] = Some(BulkUploadResult::skipped(
                    item.question,
                    item.answer,
                    REASON_DUPLICATE_QUESTION,
                ));
            } else {
                candidates.push(Candidate { position, item });
            }
        }

        if !existing.is_empty() {
            tracing::info!(
                %chatbot_id,
                skipped = results.iter().flatten().count(),
                "Skipped questions that already exist"
            );
        }

        Ok(candidates)
    }

    /// Deny the batch unless every candidate fits under the plan limit
    async fn check_batch_quota(&self, chatbot_id: Uuid, batch_len: usize) -> FaqResult<()> {
        let decision = Deadline::after(self.config.request_timeout)
            .run("quota check", self.quota.check_can_create_faq(chatbot_id))
            .await?;
        if !decision.allowed {
            return Err(quota_denied(decision));
        }

        if let Some(max) = decision.max_count {
            let prospective = decision.current_count + batch_len as u64;
            if prospective > max {
                return Err(FaqError::QuotaDenied {
                    reason: format!(
                        "batch of {} would exceed the FAQ limit of {} ({} in use)",
                        batch_len, max, decision.current_count
                    ),
                    current_count: decision.current_count,
                    max_count: Some(max),
                });
            }
        }

        Ok(())
    }

    /// Validate and embed every candidate concurrently, keeping input order
    ///
    /// No fallback vector here: an embedding failure fails the item.
    async fn embed_candidates(
        &self,
        candidates: Vec<Candidate>,
    ) -> Vec<(Candidate, FaqResult<(String, Vec<f32>)>)> {
        let budget = self.config.embed_timeout;

        stream::iter(candidates)
            .map(|candidate| async move {
                let question = candidate.item.question.trim();
                let outcome = if question.is_empty() || candidate.item.answer.trim().is_empty() {
                    Err(FaqError::Validation(
                        "question and answer must not be empty".to_string(),
                    ))
                } else {
                    self.embed(question, budget)
                        .await
                        .map(|vector| (generate_faq_id(), vector))
                };
                (candidate, outcome)
            })
            .buffered(self.config.bulk_embed_concurrency)
            .collect()
            .await
    }

    async fn index_ready(&self, chatbot_id: Uuid) -> Result<(), String> {
        let deadline = Deadline::after(self.config.request_timeout);

        let available = deadline
            .run("index liveness", async { Ok(self.index.is_available().await) })
            .await
            .map_err(|e| e.to_string())?;
        if !available {
            return Err("index store is not reachable".to_string());
        }

        match deadline
            .run("index collection", self.index.collection_exists(chatbot_id))
            .await
        {
            Ok(true) => Ok(()),
            Ok(false) => Err(format!("no index collection for chatbot {}", chatbot_id)),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn rollback_record(&self, faq_id: &str) {
        match self.records.delete(faq_id).await {
            Ok(_) => FaqSyncMetrics::record_rollback(OP_BULK),
            Err(e) => {
                tracing::error!(faq_id, error = %e, "Rollback delete failed");
                FaqSyncMetrics::record_orphan(OP_BULK, faq_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FaqSyncConfig;
    use crate::embedding::{MockVectorGenerator, VectorGenerator};
    use crate::index::{InMemoryIndexStore, MockIndexStore};
    use crate::quota::InMemoryPlanRepository;
    use crate::models::IndexDocument;
    use crate::repository::InMemoryFaqRepository;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const DIM: usize = 4;

    fn item(question: &str, answer: &str) -> BulkUploadItem {
        BulkUploadItem {
            question: question.to_string(),
            answer: answer.to_string(),
            synonym: None,
            topic_id: None,
            status: None,
        }
    }

    fn embedder() -> MockVectorGenerator {
        let mut embedder = MockVectorGenerator::new();
        embedder.expect_dimension().return_const(DIM);
        embedder
            .expect_embed()
            .returning(|text| {
                if text.contains("unembeddable") {
                    Err(FaqError::EmbeddingFailure("content filtered".to_string()))
                } else {
                    Ok(vec![0.25; DIM])
                }
            });
        embedder
    }

    fn ready_index() -> MockIndexStore {
        let mut index = MockIndexStore::new();
        index.expect_is_available().returning(|| true);
        index.expect_collection_exists().returning(|_| Ok(true));
        index
    }

    /// Index store whose liveness check or upserts for matching questions hang
    #[derive(Clone, Default)]
    struct HangingIndexStore {
        inner: InMemoryIndexStore,
        hang_liveness: bool,
        hang_question: Option<&'static str>,
    }

    #[async_trait]
    impl IndexStore for HangingIndexStore {
        async fn is_available(&self) -> bool {
            if self.hang_liveness {
                tokio::time::sleep(Duration::from_secs(600)).await;
            }
            self.inner.is_available().await
        }

        async fn collection_exists(&self, chatbot_id: Uuid) -> FaqResult<bool> {
            self.inner.collection_exists(chatbot_id).await
        }

        async fn ensure_collection(&self, chatbot_id: Uuid, dimension: usize) -> FaqResult<()> {
            self.inner.ensure_collection(chatbot_id, dimension).await
        }

        async fn upsert(&self, chatbot_id: Uuid, document: IndexDocument) -> FaqResult<bool> {
            if self.hang_question == Some(document.question.as_str()) {
                tokio::time::sleep(Duration::from_secs(600)).await;
            }
            self.inner.upsert(chatbot_id, document).await
        }

        async fn delete(&self, chatbot_id: Uuid, faq_id: &str) -> FaqResult<bool> {
            self.inner.delete(chatbot_id, faq_id).await
        }
    }

    async fn plans_for(chatbot_id: Uuid, max: Option<u64>) -> InMemoryPlanRepository {
        let plans = InMemoryPlanRepository::new();
        let tenant_id = Uuid::new_v4();
        plans.add_tenant(tenant_id, "starter", max).await;
        plans.add_chatbot(chatbot_id, tenant_id).await;
        plans
    }

    fn service<I: IndexStore>(
        records: InMemoryFaqRepository,
        index: I,
        plans: InMemoryPlanRepository,
        embedder: Arc<dyn VectorGenerator>,
    ) -> FaqSyncService<InMemoryFaqRepository, I, InMemoryPlanRepository> {
        FaqSyncService::new(records, index, plans, embedder, FaqSyncConfig::new(DIM))
    }

    async fn seed(records: &InMemoryFaqRepository, chatbot_id: Uuid, question: &str) {
        records
            .create(record_for(chatbot_id, generate_faq_id(), &item(question, "seeded")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected() {
        let chatbot_id = Uuid::new_v4();
        let svc = service(
            InMemoryFaqRepository::new(),
            MockIndexStore::new(),
            plans_for(chatbot_id, None).await,
            Arc::new(embedder()),
        );

        assert!(matches!(
            svc.bulk_upload(chatbot_id, vec![]).await,
            Err(FaqError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_all_duplicates_are_skipped_without_writes() {
        let chatbot_id = Uuid::new_v4();
        let records = InMemoryFaqRepository::new();
        seed(&records, chatbot_id, "Do you ship abroad?").await;
        seed(&records, chatbot_id, "Can I pay by invoice?").await;

        // A zero limit proves the quota guard is never consulted
        let svc = service(
            records.clone(),
            MockIndexStore::new(),
            plans_for(chatbot_id, Some(0)).await,
            Arc::new(embedder()),
        );

        let summary = svc
            .bulk_upload(
                chatbot_id,
                vec![
                    item("  Do you ship abroad?  ", "Yes"),
                    item("Can I pay by invoice?", "Yes"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(summary.success_count, 0);
        assert_eq!(summary.skipped_count, 2);
        assert!(
            summary
                .results
                .iter()
                .all(|r| r.skip_reason.as_deref() == Some(REASON_DUPLICATE_QUESTION))
        );
        assert_eq!(records.len().await, 2);
    }

    #[tokio::test]
    async fn test_quota_checked_against_prospective_count() {
        let chatbot_id = Uuid::new_v4();
        let records = InMemoryFaqRepository::new();
        for n in 0..49 {
            seed(&records, chatbot_id, &format!("Seeded question {}", n)).await;
        }

        let svc = service(
            records.clone(),
            MockIndexStore::new(),
            plans_for(chatbot_id, Some(50)).await,
            Arc::new(embedder()),
        );

        let result = svc
            .bulk_upload(
                chatbot_id,
                vec![item("New question one", "a"), item("New question two", "b")],
            )
            .await;

        assert!(matches!(
            result,
            Err(FaqError::QuotaDenied {
                current_count: 49,
                max_count: Some(50),
                ..
            })
        ));
        assert_eq!(records.len().await, 49);
    }

    #[tokio::test]
    async fn test_failed_index_write_rolls_back_only_that_item() {
        let chatbot_id = Uuid::new_v4();
        let records = InMemoryFaqRepository::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut index = ready_index();
        index.expect_upsert().returning(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                Err(FaqError::Index("shard unavailable".to_string()))
            } else {
                Ok(true)
            }
        });

        let svc = service(
            records.clone(),
            index,
            plans_for(chatbot_id, None).await,
            Arc::new(embedder()),
        );

        let summary = svc
            .bulk_upload(
                chatbot_id,
                vec![
                    item("First question", "a"),
                    item("Second question", "b"),
                    item("Third question", "c"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(
            summary.results[1].error.as_deref(),
            Some(REASON_INDEX_WRITE_FAILED)
        );
        assert_eq!(records.len().await, 2);
        for result in summary.results.iter().filter(|r| r.success) {
            let faq_id = result.faq_id.as_deref().unwrap();
            assert!(records.find_by_id(faq_id).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_embedding_failure_fails_item_without_fallback() {
        let chatbot_id = Uuid::new_v4();
        let records = InMemoryFaqRepository::new();
        let mut index = ready_index();
        index.expect_upsert().times(1).returning(|_, _| Ok(true));

        let svc = service(
            records.clone(),
            index,
            plans_for(chatbot_id, None).await,
            Arc::new(embedder()),
        );

        let summary = svc
            .bulk_upload(
                chatbot_id,
                vec![
                    item("An unembeddable question", "a"),
                    item("A fine question", "b"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.failed_count, 1);
        assert!(!summary.results[0].success);
        assert!(summary.results[1].success);
        assert_eq!(records.len().await, 1);
    }

    #[tokio::test]
    async fn test_blank_fields_fail_before_embedding() {
        let chatbot_id = Uuid::new_v4();
        let mut embedder = MockVectorGenerator::new();
        embedder.expect_dimension().return_const(DIM);
        embedder.expect_embed().times(1).returning(|_| Ok(vec![0.25; DIM]));

        let svc = service(
            InMemoryFaqRepository::new(),
            ready_index_accepting(),
            plans_for(chatbot_id, None).await,
            Arc::new(embedder),
        );

        let summary = svc
            .bulk_upload(
                chatbot_id,
                vec![item("Has an answer", "yes"), item("No answer", "   ")],
            )
            .await
            .unwrap();

        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.results[1].question, "No answer");
    }

    fn ready_index_accepting() -> MockIndexStore {
        let mut index = ready_index();
        index.expect_upsert().returning(|_, _| Ok(true));
        index
    }

    #[tokio::test]
    async fn test_missing_collection_aborts_and_rolls_back_batch() {
        let chatbot_id = Uuid::new_v4();
        let records = InMemoryFaqRepository::new();

        // Collection never provisioned
        let svc = service(
            records.clone(),
            InMemoryIndexStore::new(),
            plans_for(chatbot_id, None).await,
            Arc::new(embedder()),
        );

        let result = svc
            .bulk_upload(
                chatbot_id,
                vec![item("First question", "a"), item("Second question", "b")],
            )
            .await;

        assert!(matches!(result, Err(FaqError::IndexUnavailable(_))));
        assert!(records.is_empty().await);
    }

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let chatbot_id = Uuid::new_v4();
        let records = InMemoryFaqRepository::new();
        seed(&records, chatbot_id, "Already here").await;

        let svc = service(
            records,
            ready_index_accepting(),
            plans_for(chatbot_id, None).await,
            Arc::new(embedder()),
        );

        let summary = svc
            .bulk_upload(
                chatbot_id,
                vec![
                    item("Fresh one", "a"),
                    item("Already here", "b"),
                    item("Fresh two", "c"),
                ],
            )
            .await
            .unwrap();

        let questions: Vec<&str> = summary.results.iter().map(|r| r.question.as_str()).collect();
        assert_eq!(questions, vec!["Fresh one", "Already here", "Fresh two"]);
        assert!(summary.results[1].skipped);
        assert_eq!(
            summary.message,
            "Bulk upload finished: 2 succeeded, 1 skipped, 0 failed"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_upsert_fails_only_that_item() {
        let chatbot_id = Uuid::new_v4();
        let records = InMemoryFaqRepository::new();
        let index = HangingIndexStore {
            hang_question: Some("Slow question"),
            ..Default::default()
        };
        index.inner.ensure_collection(chatbot_id, DIM).await.unwrap();

        let svc = service(
            records.clone(),
            index.clone(),
            plans_for(chatbot_id, None).await,
            Arc::new(embedder()),
        );

        let summary = svc
            .bulk_upload(
                chatbot_id,
                vec![item("Slow question", "a"), item("Quick question", "b")],
            )
            .await
            .unwrap();

        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(
            summary.results[0].error.as_deref(),
            Some(REASON_INDEX_WRITE_FAILED)
        );
        assert!(summary.results[1].success);
        assert_eq!(records.len().await, 1);
        assert_eq!(index.inner.document_count(chatbot_id).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_liveness_check_aborts_and_rolls_back_batch() {
        let chatbot_id = Uuid::new_v4();
        let records = InMemoryFaqRepository::new();
        let index = HangingIndexStore {
            hang_liveness: true,
            ..Default::default()
        };
        index.inner.ensure_collection(chatbot_id, DIM).await.unwrap();

        let svc = service(
            records.clone(),
            index,
            plans_for(chatbot_id, None).await,
            Arc::new(embedder()),
        );

        let result = svc
            .bulk_upload(
                chatbot_id,
                vec![item("First question", "a"), item("Second question", "b")],
            )
            .await;

        assert!(matches!(result, Err(FaqError::IndexUnavailable(ref reason)) if reason.contains("index liveness")));
        assert!(records.is_empty().await);
    }
}
