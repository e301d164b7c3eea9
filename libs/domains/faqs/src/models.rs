use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;
use validator::Validate;

/// Rejects values that are empty once surrounding whitespace is removed
fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Generate a fresh FAQ id (time-ordered prefix, random suffix)
pub fn generate_faq_id() -> String {
    format!("faq_{}", Uuid::now_v7().simple())
}

/// Visibility of an FAQ to the chatbot
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    Default,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "faq_status")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FaqStatus {
    #[default]
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

pub const DEFAULT_LAYOUT: &str = "text";

/// Canonical FAQ row held by the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqRecord {
    pub id: String,
    pub chatbot_id: Uuid,
    pub topic_id: Option<String>,
    pub question: String,
    pub answer: String,
    pub synonym: String,
    pub status: FaqStatus,
    /// Presentation hint for the widget
    pub layout: String,
    pub images: Option<serde_json::Value>,
    pub hit_count: i64,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FaqRecord {
    pub fn new(input: CreateFaq) -> Self {
        let now = Utc::now();
        Self {
            id: input.id.unwrap_or_else(generate_faq_id),
            chatbot_id: input.chatbot_id,
            topic_id: input.topic_id,
            question: input.question,
            answer: input.answer,
            synonym: input.synonym,
            status: input.status,
            layout: input.layout.unwrap_or_else(|| DEFAULT_LAYOUT.to_string()),
            images: input.images,
            hit_count: 0,
            sort_order: input.sort_order,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateFaq) {
        if let Some(question) = update.question {
            self.question = question;
        }
        if let Some(answer) = update.answer {
            self.answer = answer;
        }
        if let Some(synonym) = update.synonym {
            self.synonym = synonym;
        }
        if let Some(topic_id) = update.topic_id {
            self.topic_id = topic_id;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(layout) = update.layout {
            self.layout = layout;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        if let Some(sort_order) = update.sort_order {
            self.sort_order = sort_order;
        }
        self.updated_at = Utc::now();
    }

    /// Project the searchable fields into an index document
    pub fn to_index_document(&self, vector: Vec<f32>) -> IndexDocument {
        IndexDocument {
            id: self.id.clone(),
            question: self.question.clone(),
            answer: self.answer.clone(),
            synonym: self.synonym.clone(),
            status: self.status,
            vector,
        }
    }
}

/// Candidate for a single create; `id` may be pre-assigned by the caller
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFaq {
    #[serde(default)]
    pub id: Option<String>,
    pub chatbot_id: Uuid,
    #[serde(default)]
    pub topic_id: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub question: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub answer: String,
    #[serde(default)]
    pub synonym: String,
    #[serde(default)]
    pub status: FaqStatus,
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub images: Option<serde_json::Value>,
    #[serde(default)]
    pub sort_order: i32,
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFaq {
    #[validate(custom(function = "validate_not_blank"))]
    pub question: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub answer: Option<String>,
    pub synonym: Option<String>,
    /// `Some(None)` clears the topic
    pub topic_id: Option<Option<String>>,
    pub status: Option<FaqStatus>,
    pub layout: Option<String>,
    pub images: Option<Option<serde_json::Value>>,
    pub sort_order: Option<i32>,
}

/// Search-side document, keyed by the FAQ id within a chatbot collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub synonym: String,
    pub status: FaqStatus,
    pub vector: Vec<f32>,
}

/// Plan-based allow/deny decision, computed per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub current_count: u64,
    /// `None` means the plan is unlimited
    pub max_count: Option<u64>,
}

impl QuotaDecision {
    pub fn allow(current_count: u64, max_count: Option<u64>) -> Self {
        Self {
            allowed: true,
            reason: None,
            current_count,
            max_count,
        }
    }

    pub fn deny(reason: impl Into<String>, current_count: u64, max_count: Option<u64>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            current_count,
            max_count,
        }
    }

    /// Room left under the limit; `None` when unlimited
    pub fn remaining(&self) -> Option<u64> {
        self.max_count
            .map(|max| max.saturating_sub(self.current_count))
    }
}

/// One row of a bulk upload request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkUploadItem {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub synonym: Option<String>,
    #[serde(default, rename = "topicId")]
    pub topic_id: Option<String>,
    #[serde(default)]
    pub status: Option<FaqStatus>,
}

/// Per-item outcome of a bulk upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUploadResult {
    pub success: bool,
    pub question: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faq_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

impl BulkUploadResult {
    pub fn succeeded(question: String, answer: String, faq_id: String) -> Self {
        Self {
            success: true,
            question,
            answer,
            faq_id: Some(faq_id),
            error: None,
            skipped: false,
            skip_reason: None,
        }
    }

    pub fn failed(question: String, answer: String, error: impl Into<String>) -> Self {
        Self {
            success: false,
            question,
            answer,
            faq_id: None,
            error: Some(error.into()),
            skipped: false,
            skip_reason: None,
        }
    }

    pub fn skipped(question: String, answer: String, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            question,
            answer,
            faq_id: None,
            error: None,
            skipped: true,
            skip_reason: Some(reason.into()),
        }
    }
}

/// Aggregated response for a bulk upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUploadSummary {
    pub total: usize,
    pub success_count: usize,
    pub skipped_count: usize,
    pub failed_count: usize,
    pub results: Vec<BulkUploadResult>,
    pub message: String,
}

impl BulkUploadSummary {
    pub fn from_results(results: Vec<BulkUploadResult>) -> Self {
        let success_count = results.iter().filter(|r| r.success).count();
        let skipped_count = results.iter().filter(|r| r.skipped).count();
        let failed_count = results.len() - success_count - skipped_count;

        Self {
            total: results.len(),
            success_count,
            skipped_count,
            failed_count,
            message: format!(
                "Bulk upload finished: {} succeeded, {} skipped, {} failed",
                success_count, skipped_count, failed_count
            ),
            results,
        }
    }
}
