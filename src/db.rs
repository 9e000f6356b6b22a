use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::MySqlPool;
use tracing::info;

use crate::config::{Config, StoreBackend};
use crate::store::{ContributionStore, memory::MemoryStore, mysql::MySqlStore};

pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    MySqlPool::connect(database_url).await
}

/// Builds the store selected by `STORE_BACKEND`.
pub async fn init_store(config: &Config) -> Result<Arc<dyn ContributionStore>> {
    match config.store_backend {
        StoreBackend::Mysql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set when STORE_BACKEND=mysql")?;
            let pool = init_db(url)
                .await
                .context("Failed to connect to database")?;
            let store = MySqlStore::new(pool);
            store
                .ensure_schema()
                .await
                .context("Failed to create database schema")?;
            info!("MySQL store ready");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("In-memory store ready; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
