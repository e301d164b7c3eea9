use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, SqlErr,
};
use uuid::Uuid;

use crate::{
    entity::faq,
    error::{FaqError, FaqResult},
    models::{FaqRecord, FaqStatus, UpdateFaq},
    repository::FaqRepository,
};

/// PostgreSQL record store
pub struct PgFaqRepository {
    db: DatabaseConnection,
}

impl PgFaqRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_error(err: DbErr) -> FaqError {
    FaqError::Database(err.to_string())
}

#[async_trait]
impl FaqRepository for PgFaqRepository {
    async fn find_by_id(&self, id: &str) -> FaqResult<Option<FaqRecord>> {
        let model = faq::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn create(&self, record: FaqRecord) -> FaqResult<FaqRecord> {
        let id = record.id.clone();
        let active_model: faq::ActiveModel = record.into();

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                FaqError::DuplicateId(id.clone())
            } else {
                db_error(e)
            }
        })?;

        tracing::info!(faq_id = %model.id, chatbot_id = %model.chatbot_id, "Created FAQ record");
        Ok(model.into())
    }

    async fn update(&self, id: &str, input: UpdateFaq) -> FaqResult<FaqRecord> {
        let model = faq::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or_else(|| FaqError::NotFound(id.to_string()))?;

        let mut record: FaqRecord = model.into();
        record.apply_update(input);

        let active_model = faq::ActiveModel {
            id: Set(record.id.clone()),
            topic_id: Set(record.topic_id.clone()),
            question: Set(record.question.clone()),
            answer: Set(record.answer.clone()),
            synonym: Set(record.synonym.clone()),
            status: Set(record.status),
            layout: Set(record.layout.clone()),
            images: Set(record.images.clone()),
            sort_order: Set(record.sort_order),
            updated_at: Set(record.updated_at.into()),
            ..Default::default()
        };

        let updated = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => FaqError::NotFound(id.to_string()),
            other => db_error(other),
        })?;

        tracing::info!(faq_id = %id, "Updated FAQ record");
        Ok(updated.into())
    }

    async fn delete(&self, id: &str) -> FaqResult<bool> {
        let result = faq::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        if result.rows_affected > 0 {
            tracing::info!(faq_id = %id, "Deleted FAQ record");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn find_many_by_question_in(
        &self,
        chatbot_id: Uuid,
        questions: Vec<String>,
    ) -> FaqResult<Vec<FaqRecord>> {
        if questions.is_empty() {
            return Ok(vec![]);
        }

        let models = faq::Entity::find()
            .filter(faq::Column::ChatbotId.eq(chatbot_id))
            .filter(faq::Column::Question.is_in(questions))
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_active(&self, chatbot_id: Uuid) -> FaqResult<u64> {
        faq::Entity::find()
            .filter(faq::Column::ChatbotId.eq(chatbot_id))
            .filter(faq::Column::Status.eq(FaqStatus::Active))
            .count(&self.db)
            .await
            .map_err(db_error)
    }

    async fn increment_hit_count(&self, id: &str) -> FaqResult<Option<FaqRecord>> {
        let result = faq::Entity::update_many()
            .col_expr(
                faq::Column::HitCount,
                Expr::col(faq::Column::HitCount).add(1),
            )
            .filter(faq::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }
}
