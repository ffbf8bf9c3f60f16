use sqlx::PgPool;
use uuid::Uuid;

use super::video_repo::VideoWithOwnerRow;
use crate::domain::models::{LikeTarget, VideoFeedItem};
use crate::pagination::PageParams;

fn conflict_clause(target: &LikeTarget) -> (&'static str, &'static str) {
    match target {
        LikeTarget::Video(_) => ("video_id", "(liker_id, video_id) WHERE video_id IS NOT NULL"),
        LikeTarget::Comment(_) => (
            "comment_id",
            "(liker_id, comment_id) WHERE comment_id IS NOT NULL",
        ),
        LikeTarget::Tweet(_) => ("tweet_id", "(liker_id, tweet_id) WHERE tweet_id IS NOT NULL"),
    }
}

/// Insert the like edge if it does not exist. Returns the new edge id, or
/// `None` when a duplicate already holds the slot. The partial unique
/// index arbitrates concurrent inserts, so exactly one caller wins.
pub async fn insert_if_absent(
    pool: &PgPool,
    liker_id: Uuid,
    target: LikeTarget,
) -> Result<Option<Uuid>, sqlx::Error> {
    let (column, conflict) = conflict_clause(&target);
    let query = format!(
        r#"
        INSERT INTO likes (liker_id, {column})
        VALUES ($1, $2)
        ON CONFLICT {conflict} DO NOTHING
        RETURNING id
        "#
    );
    sqlx::query_scalar::<_, Uuid>(&query)
        .bind(liker_id)
        .bind(target.id())
        .fetch_optional(pool)
        .await
}

/// Remove the like edge. Returns whether a row was actually deleted.
pub async fn delete_edge(
    pool: &PgPool,
    liker_id: Uuid,
    target: LikeTarget,
) -> Result<bool, sqlx::Error> {
    let (column, _) = conflict_clause(&target);
    let query = format!("DELETE FROM likes WHERE liker_id = $1 AND {column} = $2");
    let result = sqlx::query(&query)
        .bind(liker_id)
        .bind(target.id())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn is_liked(
    pool: &PgPool,
    liker_id: Uuid,
    target: LikeTarget,
) -> Result<bool, sqlx::Error> {
    let (column, _) = conflict_clause(&target);
    let query =
        format!("SELECT EXISTS(SELECT 1 FROM likes WHERE liker_id = $1 AND {column} = $2)");
    sqlx::query_scalar::<_, bool>(&query)
        .bind(liker_id)
        .bind(target.id())
        .fetch_one(pool)
        .await
}

pub async fn count_for(pool: &PgPool, target: LikeTarget) -> Result<i64, sqlx::Error> {
    let (column, _) = conflict_clause(&target);
    let query = format!("SELECT COUNT(*) FROM likes WHERE {column} = $1");
    sqlx::query_scalar::<_, i64>(&query)
        .bind(target.id())
        .fetch_one(pool)
        .await
}

/// One page of the published videos the user has liked, newest like
/// first, with owner summaries joined in. Likes whose video has since
/// been deleted or unpublished drop out of the join.
pub async fn liked_videos(
    pool: &PgPool,
    liker_id: Uuid,
    params: &PageParams,
) -> Result<(Vec<VideoFeedItem>, i64), sqlx::Error> {
    let rows = sqlx::query_as::<_, VideoWithOwnerRow>(
        r#"
        SELECT v.id, v.title, v.description, v.video_url, v.thumbnail_url,
               v.duration, v.views, v.is_published, v.created_at,
               u.id AS owner_id, u.username AS owner_username,
               u.full_name AS owner_full_name, u.avatar_url AS owner_avatar_url
        FROM likes l
        INNER JOIN videos v ON v.id = l.video_id
        INNER JOIN users u ON u.id = v.owner_id
        WHERE l.liker_id = $1 AND v.is_published = TRUE
        ORDER BY l.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(liker_id)
    .bind(params.limit)
    .bind(params.offset())
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM likes l
        INNER JOIN videos v ON v.id = l.video_id
        WHERE l.liker_id = $1 AND v.is_published = TRUE
        "#,
    )
    .bind(liker_id)
    .fetch_one(pool)
    .await?;

    Ok((rows.into_iter().map(Into::into).collect(), total))
}
