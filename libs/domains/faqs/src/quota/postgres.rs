use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use super::{PlanLimits, PlanLookup, PlanRepository};
use crate::entity::{chatbot, plan, tenant};
use crate::error::{FaqError, FaqResult};

/// Resolves chatbot -> tenant -> plan from PostgreSQL
pub struct PgPlanRepository {
    db: DatabaseConnection,
}

impl PgPlanRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlanRepository for PgPlanRepository {
    async fn lookup_for_chatbot(&self, chatbot_id: Uuid) -> FaqResult<PlanLookup> {
        let Some(chatbot) = chatbot::Entity::find_by_id(chatbot_id).one(&self.db).await? else {
            return Ok(PlanLookup::ChatbotNotFound);
        };

        let tenant = tenant::Entity::find_by_id(chatbot.tenant_id)
            .one(&self.db)
            .await?;
        let Some(tenant) = tenant.filter(|t| t.is_active) else {
            return Ok(PlanLookup::TenantUnavailable);
        };

        let plan = plan::Entity::find_by_id(tenant.plan_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                FaqError::Database(format!(
                    "tenant {} references missing plan {}",
                    tenant.id, tenant.plan_id
                ))
            })?;

        Ok(PlanLookup::Found(PlanLimits {
            plan_name: plan.name,
            max_faqs_per_bot: plan.max_faqs_per_bot.map(|max| max.max(0) as u64),
        }))
    }
}
