use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::db;
use crate::services::storage::{AssetStorage, S3AssetStorage};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub storage: Arc<dyn AssetStorage>,
}

impl AppState {
    /// Connect the pool, run migrations, and build the storage client.
    pub async fn initialize(config: Config) -> anyhow::Result<Self> {
        let pool = db::create_pool(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;

        db::run_migrations(&pool).await?;

        let storage = S3AssetStorage::from_config(&config.storage).await?;

        Ok(Self {
            db: pool,
            config: Arc::new(config),
            storage: Arc::new(storage),
        })
    }

    /// Assemble state from pre-built parts. Used by tests to inject a
    /// lazy pool or a fake storage backend.
    pub fn from_parts(db: PgPool, config: Config, storage: Arc<dyn AssetStorage>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            storage,
        }
    }
}
