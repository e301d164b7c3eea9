//! Plan-based limits on FAQ creation

mod memory;
mod postgres;

pub use memory::InMemoryPlanRepository;
pub use postgres::PgPlanRepository;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::FaqResult;
use crate::models::QuotaDecision;
use crate::repository::FaqRepository;

pub const REASON_CHATBOT_NOT_FOUND: &str = "chatbot not found";
pub const REASON_TENANT_UNAVAILABLE: &str = "tenant not found or inactive";

/// Limits of the plan a chatbot's tenant is subscribed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLimits {
    pub plan_name: String,
    /// `None` means unlimited
    pub max_faqs_per_bot: Option<u64>,
}

/// Outcome of resolving chatbot -> tenant -> plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanLookup {
    ChatbotNotFound,
    /// Tenant row missing or deactivated
    TenantUnavailable,
    Found(PlanLimits),
}

/// Read access to the billing plan of a chatbot's tenant
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn lookup_for_chatbot(&self, chatbot_id: Uuid) -> FaqResult<PlanLookup>;
}

/// Computes allow/deny decisions for FAQ creation
pub struct QuotaGuard<P: PlanRepository, R: FaqRepository> {
    plans: Arc<P>,
    faqs: Arc<R>,
}

impl<P: PlanRepository, R: FaqRepository> Clone for QuotaGuard<P, R> {
    fn clone(&self) -> Self {
        Self {
            plans: Arc::clone(&self.plans),
            faqs: Arc::clone(&self.faqs),
        }
    }
}

impl<P: PlanRepository, R: FaqRepository> QuotaGuard<P, R> {
    pub fn new(plans: Arc<P>, faqs: Arc<R>) -> Self {
        Self { plans, faqs }
    }

    /// Whether one more FAQ may be created for the chatbot
    ///
    /// Unlimited plans short-circuit without counting. Otherwise active FAQs
    /// are counted and the request is denied once `current >= max`. Store
    /// errors propagate instead of turning into a denial.
    #[tracing::instrument(skip(self))]
    pub async fn check_can_create_faq(&self, chatbot_id: Uuid) -> FaqResult<QuotaDecision> {
        let limits = match self.plans.lookup_for_chatbot(chatbot_id).await? {
            PlanLookup::ChatbotNotFound => {
                return Ok(QuotaDecision::deny(REASON_CHATBOT_NOT_FOUND, 0, Some(0)));
            }
            PlanLookup::TenantUnavailable => {
                return Ok(QuotaDecision::deny(REASON_TENANT_UNAVAILABLE, 0, Some(0)));
            }
            PlanLookup::Found(limits) => limits,
        };

        let Some(max) = limits.max_faqs_per_bot else {
            return Ok(QuotaDecision::allow(0, None));
        };

        let current = self.faqs.count_active(chatbot_id).await?;

        if current >= max {
            tracing::info!(
                %chatbot_id,
                plan = %limits.plan_name,
                current,
                max,
                "FAQ quota reached"
            );
            return Ok(QuotaDecision::deny(
                format!(
                    "FAQ limit reached for plan '{}': {} of {} used",
                    limits.plan_name, current, max
                ),
                current,
                Some(max),
            ));
        }

        Ok(QuotaDecision::allow(current, Some(max)))
    }
}
