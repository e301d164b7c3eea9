//! FAQ Sync
//!
//! Operator CLI for keeping chatbot FAQs consistent between PostgreSQL and the
//! Qdrant vector index. Runs migrations, provisions per-chatbot collections,
//! ingests bulk uploads and repairs single documents.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::DatabaseConnection;
use domain_faqs::{
    BulkUploadItem, CreateFaq, FaqStatus, FaqSyncService, IndexStore, OpenAIVectorGenerator,
    PgFaqRepository, PgPlanRepository, QdrantIndexStore,
};
use eyre::{Result, WrapErr};
use tracing::info;
use uuid::Uuid;

mod config;

use config::Config;

type Service = FaqSyncService<PgFaqRepository, QdrantIndexStore, PgPlanRepository>;

#[derive(Parser)]
#[command(name = "faq-sync")]
#[command(about = "Synchronize chatbot FAQs between the record store and the vector index")]
struct Cli {
    /// Dump the Prometheus metrics to stderr when the command finishes
    #[arg(long, global = true)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Probe both stores and print their status
    Health,

    /// Create the chatbot's index collection if it is missing
    ProvisionIndex {
        #[arg(short, long)]
        chatbot: Uuid,
    },

    /// Create a single FAQ
    Create {
        #[arg(short, long)]
        chatbot: Uuid,

        #[arg(short, long)]
        question: String,

        #[arg(short, long)]
        answer: String,

        #[arg(short, long, default_value = "")]
        synonym: String,

        #[arg(short, long)]
        topic: Option<String>,

        /// Store the FAQ as inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Upload a JSON array of FAQs and print the per-item summary
    BulkUpload {
        #[arg(short, long)]
        chatbot: Uuid,

        /// File containing `[{"question": .., "answer": .., ...}]`
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show whether the chatbot may create another FAQ
    Quota {
        #[arg(short, long)]
        chatbot: Uuid,
    },

    /// Re-embed an FAQ and rewrite its index document
    Reindex {
        #[arg(short, long)]
        id: String,
    },

    /// Delete an FAQ from both stores
    Delete {
        #[arg(short, long)]
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    // Initialize metrics
    observability::init_metrics();

    let cli = Cli::parse();

    info!("Connecting to database...");
    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("Database connection failed: {}", e))?;

    match cli.command {
        Commands::Migrate => {
            database::postgres::run_migrations::<migration::Migrator>(&db, "faq-sync").await?;
        }

        Commands::Health => {
            let index = QdrantIndexStore::new(config.qdrant.clone())?;
            let postgres = database::postgres::check_health_detailed(&db).await;
            let schema = database::postgres::check_table_readable(&db, "faqs").await;
            let report = serde_json::json!({
                "postgres": {
                    "healthy": postgres.healthy,
                    "message": postgres.message,
                    "responseTimeMs": postgres.response_time_ms,
                },
                "migrated": schema.is_ok(),
                "index": { "available": index.is_available().await },
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::ProvisionIndex { chatbot } => {
            build_service(&config, db)?.provision_index(chatbot).await?;
            info!(%chatbot, "Index collection ready");
        }

        Commands::Create {
            chatbot,
            question,
            answer,
            synonym,
            topic,
            inactive,
        } => {
            let status = if inactive {
                FaqStatus::Inactive
            } else {
                FaqStatus::Active
            };
            let record = build_service(&config, db)?
                .create_faq(CreateFaq {
                    id: None,
                    chatbot_id: chatbot,
                    topic_id: topic,
                    question,
                    answer,
                    synonym,
                    status,
                    layout: None,
                    images: None,
                    sort_order: 0,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::BulkUpload { chatbot, file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
            let items: Vec<BulkUploadItem> = serde_json::from_str(&raw)
                .wrap_err_with(|| format!("{} is not a JSON array of FAQs", file.display()))?;

            let summary = build_service(&config, db)?
                .bulk_upload(chatbot, items)
                .await?;

            info!(
                "Bulk upload complete: {} succeeded, {} skipped, {} failed",
                summary.success_count, summary.skipped_count, summary.failed_count
            );
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Quota { chatbot } => {
            let decision = build_service(&config, db)?.check_quota(chatbot).await?;
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }

        Commands::Reindex { id } => {
            let record = build_service(&config, db)?.reindex_faq(&id).await?;
            info!(faq_id = %record.id, "Index document rewritten");
        }

        Commands::Delete { id } => {
            build_service(&config, db)?.delete_faq(&id).await?;
            info!(faq_id = %id, "FAQ deleted");
        }
    }

    if cli.print_metrics {
        eprintln!("{}", observability::render_metrics());
    }

    Ok(())
}

fn build_service(config: &Config, db: DatabaseConnection) -> Result<Service> {
    let embedder =
        OpenAIVectorGenerator::from_env().wrap_err("Embedding provider not configured")?;
    let index = QdrantIndexStore::new(config.qdrant.clone())?;

    Ok(FaqSyncService::new(
        PgFaqRepository::new(db.clone()),
        index,
        PgPlanRepository::new(db),
        Arc::new(embedder),
        config.sync.clone(),
    ))
}
