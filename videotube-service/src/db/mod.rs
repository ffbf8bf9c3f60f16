//! Storage adapters. Thin sqlx query layers over the entity and
//! relationship tables; all derived counts are computed here at read time,
//! never written back.

pub mod comment_repo;
pub mod like_repo;
pub mod playlist_repo;
pub mod subscription_repo;
pub mod tweet_repo;
pub mod user_repo;
pub mod video_repo;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Build the connection pool the way every service here does: bounded,
/// with an acquire timeout so a stalled database surfaces as an error
/// instead of hanging the caller.
pub async fn create_pool(
    url: &str,
    max_connections: u32,
    min_connections: u32,
) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(url)
        .await
        .context("Failed to connect to database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("Failed to verify database connection")?;

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(())
}
