use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use std::time::Instant;
use tracing::debug;

use crate::common::DatabaseError;

async fn probe(db: &DatabaseConnection, sql: String) -> Result<(), DatabaseError> {
    let stmt = Statement::from_string(DatabaseBackend::Postgres, sql.clone());
    db.query_one_raw(stmt)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(format!("`{}` failed: {}", sql, e)))?;
    Ok(())
}

/// `SELECT 1` against the pool
pub async fn check_health(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    debug!("Running PostgreSQL health check");
    probe(db, "SELECT 1".to_string()).await
}

/// Fails when `table` is missing, e.g. before migrations have run
///
/// `table` is interpolated verbatim and must come from code, never from input.
pub async fn check_table_readable(db: &DatabaseConnection, table: &str) -> Result<(), DatabaseError> {
    debug!(table, "Checking table is readable");
    probe(db, format!("SELECT 1 FROM {} LIMIT 1", table)).await
}

/// Outcome of a health probe with its latency
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthStatus {
    pub fn healthy(response_time_ms: u64) -> Self {
        Self {
            healthy: true,
            message: None,
            response_time_ms,
        }
    }

    pub fn unhealthy(message: impl Into<String>, response_time_ms: u64) -> Self {
        Self {
            healthy: false,
            message: Some(message.into()),
            response_time_ms,
        }
    }
}

/// Like [`check_health`] but never errors
pub async fn check_health_detailed(db: &DatabaseConnection) -> HealthStatus {
    let started = Instant::now();
    let result = check_health(db).await;
    let elapsed = started.elapsed().as_millis() as u64;

    match result {
        Ok(()) => HealthStatus::healthy(elapsed),
        Err(e) => HealthStatus::unhealthy(e.to_string(), elapsed),
    }
}
