//! Integration tests for the FAQs domain
//!
//! These tests use real PostgreSQL via testcontainers to ensure:
//! - The sea-orm entities match the migrated schema
//! - Unique ids and foreign keys are enforced
//! - Plan lookups follow chatbot -> tenant -> plan
//! - The synchronizer works against the real record store

use std::sync::Arc;

use async_trait::async_trait;
use domain_faqs::*;
use test_utils::{TestDatabase, TestDataBuilder, assertions::*};
use uuid::Uuid;

const DIM: usize = 4;

struct ConstantGenerator;

#[async_trait]
impl VectorGenerator for ConstantGenerator {
    fn dimension(&self) -> usize {
        DIM
    }

    async fn embed(&self, _text: &str) -> FaqResult<Vec<f32>> {
        Ok(vec![0.5; DIM])
    }
}

/// Plan + tenant + chatbot rows so FAQ foreign keys resolve
async fn seed_chatbot(db: &TestDatabase, chatbot_id: Uuid, max_faqs: Option<i64>) {
    let plan_id = db.create_plan("starter", max_faqs).await;
    let tenant_id = db.create_tenant(plan_id, true).await;
    db.create_chatbot(chatbot_id, tenant_id).await;
}

fn record(chatbot_id: Uuid, id: &str, question: &str) -> FaqRecord {
    FaqRecord::new(CreateFaq {
        id: Some(id.to_string()),
        chatbot_id,
        topic_id: None,
        question: question.to_string(),
        answer: "Integration answer".to_string(),
        synonym: "integration".to_string(),
        status: FaqStatus::Active,
        layout: None,
        images: Some(serde_json::json!(["https://cdn.example.com/a.png"])),
        sort_order: 3,
    })
}

// ============================================================================
// Record Store Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_find_faq() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("pg_create_and_find");
    let chatbot_id = builder.chatbot_id();
    seed_chatbot(&db, chatbot_id, None).await;
    let repo = PgFaqRepository::new(db.connection());

    let faq_id = builder.faq_id("invoices");
    let input = record(chatbot_id, &faq_id, &builder.question("invoices"));
    let created = repo.create(input.clone()).await.unwrap();

    assert_eq!(created.id, faq_id);
    assert_uuid_eq(created.chatbot_id, chatbot_id, "chatbot_id");

    let retrieved = assert_some(
        repo.find_by_id(&faq_id).await.unwrap(),
        "faq should exist",
    );
    assert_eq!(retrieved.question, input.question);
    assert_eq!(retrieved.answer, input.answer);
    assert_eq!(retrieved.synonym, input.synonym);
    assert_eq!(retrieved.status, FaqStatus::Active);
    assert_eq!(retrieved.layout, "text");
    assert_eq!(retrieved.images, input.images);
    assert_eq!(retrieved.sort_order, 3);
}

#[tokio::test]
async fn test_duplicate_id_is_rejected() {
    let db = TestDatabase::new().await;
    let chatbot_id = Uuid::new_v4();
    seed_chatbot(&db, chatbot_id, None).await;
    let repo = PgFaqRepository::new(db.connection());

    repo.create(record(chatbot_id, "faq_dup", "First?"))
        .await
        .unwrap();
    let result = repo.create(record(chatbot_id, "faq_dup", "Second?")).await;

    assert!(matches!(result, Err(FaqError::DuplicateId(ref id)) if id == "faq_dup"));
}

#[tokio::test]
async fn test_partial_update() {
    let db = TestDatabase::new().await;
    let chatbot_id = Uuid::new_v4();
    seed_chatbot(&db, chatbot_id, None).await;
    let repo = PgFaqRepository::new(db.connection());
    repo.create(record(chatbot_id, "faq_update", "Before?"))
        .await
        .unwrap();

    let updated = repo
        .update(
            "faq_update",
            UpdateFaq {
                answer: Some("After".to_string()),
                images: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.question, "Before?");
    assert_eq!(updated.answer, "After");
    assert_eq!(updated.images, None);
}

#[tokio::test]
async fn test_update_missing_is_not_found() {
    let db = TestDatabase::new().await;
    let repo = PgFaqRepository::new(db.connection());

    let result = repo.update("faq_missing", UpdateFaq::default()).await;

    assert!(matches!(result, Err(FaqError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_reports_whether_row_existed() {
    let db = TestDatabase::new().await;
    let chatbot_id = Uuid::new_v4();
    seed_chatbot(&db, chatbot_id, None).await;
    let repo = PgFaqRepository::new(db.connection());
    repo.create(record(chatbot_id, "faq_delete", "Bye?"))
        .await
        .unwrap();

    assert!(repo.delete("faq_delete").await.unwrap());
    assert!(!repo.delete("faq_delete").await.unwrap());
}

#[tokio::test]
async fn test_question_lookup_and_active_count() {
    let db = TestDatabase::new().await;
    let chatbot_id = Uuid::new_v4();
    let other_chatbot = Uuid::new_v4();
    seed_chatbot(&db, chatbot_id, None).await;
    seed_chatbot(&db, other_chatbot, None).await;
    let repo = PgFaqRepository::new(db.connection());

    repo.create(record(chatbot_id, "faq_a", "Alpha?")).await.unwrap();
    let mut inactive = record(chatbot_id, "faq_b", "Beta?");
    inactive.status = FaqStatus::Inactive;
    repo.create(inactive).await.unwrap();
    repo.create(record(other_chatbot, "faq_c", "Alpha?"))
        .await
        .unwrap();

    let found = repo
        .find_many_by_question_in(
            chatbot_id,
            vec!["Alpha?".to_string(), "Beta?".to_string(), "Gamma?".to_string()],
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|f| f.chatbot_id == chatbot_id));

    assert_eq!(repo.count_active(chatbot_id).await.unwrap(), 1);
    assert_eq!(repo.count_active(other_chatbot).await.unwrap(), 1);
}

#[tokio::test]
async fn test_increment_hit_count_is_atomic_bump() {
    let db = TestDatabase::new().await;
    let chatbot_id = Uuid::new_v4();
    seed_chatbot(&db, chatbot_id, None).await;
    let repo = PgFaqRepository::new(db.connection());
    repo.create(record(chatbot_id, "faq_hits", "Hit me?"))
        .await
        .unwrap();

    repo.increment_hit_count("faq_hits").await.unwrap();
    let bumped = assert_some(
        repo.increment_hit_count("faq_hits").await.unwrap(),
        "faq should exist",
    );

    assert_eq!(bumped.hit_count, 2);
    assert!(repo.increment_hit_count("faq_missing").await.unwrap().is_none());
}

// ============================================================================
// Plan Lookup Tests
// ============================================================================

#[tokio::test]
async fn test_plan_lookup_resolves_limits() {
    let db = TestDatabase::new().await;
    let chatbot_id = Uuid::new_v4();
    seed_chatbot(&db, chatbot_id, Some(50)).await;
    let plans = PgPlanRepository::new(db.connection());

    let lookup = plans.lookup_for_chatbot(chatbot_id).await.unwrap();

    assert_eq!(
        lookup,
        PlanLookup::Found(PlanLimits {
            plan_name: "starter".to_string(),
            max_faqs_per_bot: Some(50),
        })
    );
}

#[tokio::test]
async fn test_plan_lookup_inactive_tenant_and_missing_chatbot() {
    let db = TestDatabase::new().await;
    let plan_id = db.create_plan("pro", None).await;
    let tenant_id = db.create_tenant(plan_id, false).await;
    let chatbot_id = db.create_chatbot(Uuid::new_v4(), tenant_id).await;
    let plans = PgPlanRepository::new(db.connection());

    assert_eq!(
        plans.lookup_for_chatbot(chatbot_id).await.unwrap(),
        PlanLookup::TenantUnavailable
    );
    assert_eq!(
        plans.lookup_for_chatbot(Uuid::new_v4()).await.unwrap(),
        PlanLookup::ChatbotNotFound
    );
}

// ============================================================================
// Synchronizer Tests
// ============================================================================

#[tokio::test]
async fn test_service_quota_and_bulk_upload_against_postgres() {
    let db = TestDatabase::new().await;
    let chatbot_id = Uuid::new_v4();
    seed_chatbot(&db, chatbot_id, Some(3)).await;
    let index = InMemoryIndexStore::new();
    let service = FaqSyncService::new(
        PgFaqRepository::new(db.connection()),
        index.clone(),
        PgPlanRepository::new(db.connection()),
        Arc::new(ConstantGenerator),
        FaqSyncConfig::new(DIM),
    );
    service.provision_index(chatbot_id).await.unwrap();

    service
        .create_faq(CreateFaq {
            id: None,
            chatbot_id,
            topic_id: None,
            question: "Already there?".to_string(),
            answer: "Yes".to_string(),
            synonym: String::new(),
            status: FaqStatus::Active,
            layout: None,
            images: None,
            sort_order: 0,
        })
        .await
        .unwrap();

    let summary = service
        .bulk_upload(
            chatbot_id,
            vec![
                BulkUploadItem {
                    question: "Already there?".to_string(),
                    answer: "Yes".to_string(),
                    synonym: None,
                    topic_id: None,
                    status: None,
                },
                BulkUploadItem {
                    question: "Brand new?".to_string(),
                    answer: "Yes".to_string(),
                    synonym: Some("fresh".to_string()),
                    topic_id: Some("misc".to_string()),
                    status: None,
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.skipped_count, 1);
    assert_eq!(index.document_count(chatbot_id).await, 2);

    let decision = service.check_quota(chatbot_id).await.unwrap();
    assert_eq!(decision.current_count, 2);
    assert_eq!(decision.remaining(), Some(1));
}
