use crate::domain::models::{OwnerSummary, User};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn find_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, full_name, avatar_url, cover_image_url,
               created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn user_exists(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

pub async fn owner_summary(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<OwnerSummary>, sqlx::Error> {
    sqlx::query_as::<_, OwnerSummary>(
        r#"
        SELECT id, username, full_name, avatar_url
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
