use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PlanLimits, PlanLookup, PlanRepository};
use crate::error::FaqResult;

#[derive(Debug, Clone)]
struct Tenant {
    active: bool,
    limits: PlanLimits,
}

/// In-memory plan lookup (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryPlanRepository {
    tenants: Arc<RwLock<HashMap<Uuid, Tenant>>>,
    chatbots: Arc<RwLock<HashMap<Uuid, Uuid>>>,
}

impl InMemoryPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tenant on a plan with the given FAQ limit
    pub async fn add_tenant(&self, tenant_id: Uuid, plan_name: &str, max_faqs_per_bot: Option<u64>) {
        self.tenants.write().await.insert(
            tenant_id,
            Tenant {
                active: true,
                limits: PlanLimits {
                    plan_name: plan_name.to_string(),
                    max_faqs_per_bot,
                },
            },
        );
    }

    pub async fn set_tenant_active(&self, tenant_id: Uuid, active: bool) {
        if let Some(tenant) = self.tenants.write().await.get_mut(&tenant_id) {
            tenant.active = active;
        }
    }

    pub async fn add_chatbot(&self, chatbot_id: Uuid, tenant_id: Uuid) {
        self.chatbots.write().await.insert(chatbot_id, tenant_id);
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn lookup_for_chatbot(&self, chatbot_id: Uuid) -> FaqResult<PlanLookup> {
        let Some(tenant_id) = self.chatbots.read().await.get(&chatbot_id).copied() else {
            return Ok(PlanLookup::ChatbotNotFound);
        };

        let tenants = self.tenants.read().await;
        Ok(match tenants.get(&tenant_id) {
            Some(tenant) if tenant.active => PlanLookup::Found(tenant.limits.clone()),
            _ => PlanLookup::TenantUnavailable,
        })
    }
}
