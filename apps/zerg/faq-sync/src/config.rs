//! Configuration for the FAQ sync CLI

use core_config::{Environment, FromEnv};
use database::postgres::PostgresConfig;
use domain_faqs::{FaqSyncConfig, QdrantConfig};
use eyre::Result;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub database: PostgresConfig,
    pub qdrant: QdrantConfig,
    pub sync: FaqSyncConfig,
}

impl Config {
    /// Loads everything except the embedding credentials, which only
    /// commands that build the synchronizer need.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            environment: Environment::from_env(),
            database: <PostgresConfig as FromEnv>::from_env()?,
            qdrant: QdrantConfig::from_env()?,
            sync: FaqSyncConfig::from_env()?,
        })
    }
}
