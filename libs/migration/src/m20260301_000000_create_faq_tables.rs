use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create faq_status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(FaqStatus::Enum)
                    .values([FaqStatus::Active, FaqStatus::Inactive])
                    .to_owned(),
            )
            .await?;

        // Billing plans; NULL limit means unlimited
        manager
            .create_table(
                Table::create()
                    .table(Plans::Table)
                    .if_not_exists()
                    .col(pk_uuid(Plans::Id))
                    .col(string(Plans::Name))
                    .col(big_integer_null(Plans::MaxFaqsPerBot))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tenants::Table)
                    .if_not_exists()
                    .col(pk_uuid(Tenants::Id))
                    .col(uuid(Tenants::PlanId))
                    .col(string(Tenants::Name))
                    .col(boolean(Tenants::IsActive).default(true))
                    .col(
                        timestamp_with_time_zone(Tenants::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenants_plan_id")
                            .from(Tenants::Table, Tenants::PlanId)
                            .to(Plans::Table, Plans::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Chatbots::Table)
                    .if_not_exists()
                    .col(pk_uuid(Chatbots::Id))
                    .col(uuid(Chatbots::TenantId))
                    .col(string(Chatbots::Name))
                    .col(
                        timestamp_with_time_zone(Chatbots::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chatbots_tenant_id")
                            .from(Chatbots::Table, Chatbots::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create faqs table
        manager
            .create_table(
                Table::create()
                    .table(Faqs::Table)
                    .if_not_exists()
                    .col(string(Faqs::Id).primary_key())
                    .col(uuid(Faqs::ChatbotId))
                    .col(string_null(Faqs::TopicId))
                    .col(text(Faqs::Question))
                    .col(text(Faqs::Answer))
                    .col(text(Faqs::Synonym).default(""))
                    .col(
                        ColumnDef::new(Faqs::Status)
                            .enumeration(FaqStatus::Enum, [FaqStatus::Active, FaqStatus::Inactive])
                            .not_null()
                            .default("active"),
                    )
                    .col(string(Faqs::Layout).default("text"))
                    .col(json_null(Faqs::Images))
                    .col(big_integer(Faqs::HitCount).default(0))
                    .col(integer(Faqs::SortOrder).default(0))
                    .col(
                        timestamp_with_time_zone(Faqs::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Faqs::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_faqs_chatbot_id")
                            .from(Faqs::Table, Faqs::ChatbotId)
                            .to(Chatbots::Table, Chatbots::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Duplicate detection in bulk upload
        manager
            .create_index(
                Index::create()
                    .name("idx_faqs_chatbot_id_question")
                    .table(Faqs::Table)
                    .col(Faqs::ChatbotId)
                    .col(Faqs::Question)
                    .to_owned(),
            )
            .await?;

        // Quota counting
        manager
            .create_index(
                Index::create()
                    .name("idx_faqs_chatbot_id_status")
                    .table(Faqs::Table)
                    .col(Faqs::ChatbotId)
                    .col(Faqs::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Faqs::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Chatbots::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Tenants::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Plans::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(FaqStatus::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Plans {
    Table,
    Id,
    Name,
    MaxFaqsPerBot,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
    PlanId,
    Name,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Chatbots {
    Table,
    Id,
    TenantId,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Faqs {
    Table,
    Id,
    ChatbotId,
    TopicId,
    Question,
    Answer,
    Synonym,
    Status,
    Layout,
    Images,
    HitCount,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FaqStatus {
    #[sea_orm(iden = "faq_status")]
    Enum,
    #[sea_orm(iden = "active")]
    Active,
    #[sea_orm(iden = "inactive")]
    Inactive,
}
