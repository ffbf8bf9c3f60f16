use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::models::{Comment, CommentTarget, CommentView, OwnerSummary};
use crate::pagination::PageParams;

#[derive(sqlx::FromRow)]
struct CommentViewRow {
    id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    owner_id: Uuid,
    owner_username: String,
    owner_full_name: String,
    owner_avatar_url: Option<String>,
    total_likes: i64,
}

impl From<CommentViewRow> for CommentView {
    fn from(row: CommentViewRow) -> Self {
        CommentView {
            id: row.id,
            content: row.content,
            created_at: row.created_at,
            owner: OwnerSummary {
                id: row.owner_id,
                username: row.owner_username,
                full_name: row.owner_full_name,
                avatar_url: row.owner_avatar_url,
            },
            total_likes: row.total_likes,
        }
    }
}

fn target_column(target: &CommentTarget) -> &'static str {
    match target {
        CommentTarget::Video(_) => "video_id",
        CommentTarget::Tweet(_) => "tweet_id",
    }
}

pub async fn create_comment(
    pool: &PgPool,
    owner_id: Uuid,
    target: CommentTarget,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    let query = format!(
        r#"
        INSERT INTO comments (owner_id, {column}, content)
        VALUES ($1, $2, $3)
        RETURNING id, owner_id, content, video_id, tweet_id, created_at, updated_at
        "#,
        column = target_column(&target),
    );
    sqlx::query_as::<_, Comment>(&query)
        .bind(owner_id)
        .bind(target.id())
        .bind(content)
        .fetch_one(pool)
        .await
}

pub async fn find_comment_by_id(
    pool: &PgPool,
    comment_id: Uuid,
) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, owner_id, content, video_id, tweet_id, created_at, updated_at
        FROM comments
        WHERE id = $1
        "#,
    )
    .bind(comment_id)
    .fetch_optional(pool)
    .await
}

pub async fn comment_exists(pool: &PgPool, comment_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1)")
        .bind(comment_id)
        .fetch_one(pool)
        .await
}

/// Paginated comment thread for one target, newest first, with commenter
/// summaries and per-comment like counts joined in.
pub async fn thread(
    pool: &PgPool,
    target: CommentTarget,
    params: &PageParams,
) -> Result<(Vec<CommentView>, i64), sqlx::Error> {
    let column = target_column(&target);
    let query = format!(
        r#"
        SELECT c.id, c.content, c.created_at,
               u.id AS owner_id, u.username AS owner_username,
               u.full_name AS owner_full_name, u.avatar_url AS owner_avatar_url,
               (SELECT COUNT(*) FROM likes l WHERE l.comment_id = c.id) AS total_likes
        FROM comments c
        INNER JOIN users u ON u.id = c.owner_id
        WHERE c.{column} = $1
        ORDER BY c.created_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    let rows = sqlx::query_as::<_, CommentViewRow>(&query)
        .bind(target.id())
        .bind(params.limit)
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

    let count_query = format!("SELECT COUNT(*) FROM comments WHERE {column} = $1");
    let total = sqlx::query_scalar::<_, i64>(&count_query)
        .bind(target.id())
        .fetch_one(pool)
        .await?;

    Ok((rows.into_iter().map(Into::into).collect(), total))
}

pub async fn update_comment(
    pool: &PgPool,
    comment_id: Uuid,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments
        SET content = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, owner_id, content, video_id, tweet_id, created_at, updated_at
        "#,
    )
    .bind(comment_id)
    .bind(content)
    .fetch_one(pool)
    .await
}

pub async fn delete_comment(pool: &PgPool, comment_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
