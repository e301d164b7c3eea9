use crate::models::{FaqRecord, FaqStatus};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sea-ORM Entity for the faqs table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "faqs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub chatbot_id: Uuid,
    pub topic_id: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub question: String,
    #[sea_orm(column_type = "Text")]
    pub answer: String,
    #[sea_orm(column_type = "Text")]
    pub synonym: String,
    pub status: FaqStatus,
    pub layout: String,
    pub images: Option<Json>,
    pub hit_count: i64,
    pub sort_order: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for FaqRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            chatbot_id: model.chatbot_id,
            topic_id: model.topic_id,
            question: model.question,
            answer: model.answer,
            synonym: model.synonym,
            status: model.status,
            layout: model.layout,
            images: model.images,
            hit_count: model.hit_count,
            sort_order: model.sort_order,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<FaqRecord> for ActiveModel {
    fn from(record: FaqRecord) -> Self {
        ActiveModel {
            id: Set(record.id),
            chatbot_id: Set(record.chatbot_id),
            topic_id: Set(record.topic_id),
            question: Set(record.question),
            answer: Set(record.answer),
            synonym: Set(record.synonym),
            status: Set(record.status),
            layout: Set(record.layout),
            images: Set(record.images),
            hit_count: Set(record.hit_count),
            sort_order: Set(record.sort_order),
            created_at: Set(record.created_at.into()),
            updated_at: Set(record.updated_at.into()),
        }
    }
}
