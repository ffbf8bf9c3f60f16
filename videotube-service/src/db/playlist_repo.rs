use sqlx::PgPool;
use uuid::Uuid;

use super::video_repo::VideoWithOwnerRow;
use crate::domain::models::{Playlist, PlaylistSummary, VideoFeedItem};
use crate::pagination::PageParams;

const SUMMARY_SELECT: &str = r#"
    SELECT p.id, p.owner_id, p.name, p.description, p.cover_image_url, p.created_at,
           COUNT(v.id) AS total_videos,
           COALESCE(SUM(v.views), 0)::BIGINT AS total_views,
           COALESCE(SUM(v.duration), 0)::DOUBLE PRECISION AS total_duration
    FROM playlists p
    LEFT JOIN playlist_videos pv ON pv.playlist_id = p.id
    LEFT JOIN videos v ON v.id = pv.video_id
"#;

pub async fn create_playlist(
    pool: &PgPool,
    owner_id: Uuid,
    name: &str,
    description: &str,
) -> Result<Playlist, sqlx::Error> {
    sqlx::query_as::<_, Playlist>(
        r#"
        INSERT INTO playlists (owner_id, name, description)
        VALUES ($1, $2, $3)
        RETURNING id, owner_id, name, description, cover_image_url, created_at, updated_at
        "#,
    )
    .bind(owner_id)
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn find_playlist_by_id(
    pool: &PgPool,
    playlist_id: Uuid,
) -> Result<Option<Playlist>, sqlx::Error> {
    sqlx::query_as::<_, Playlist>(
        r#"
        SELECT id, owner_id, name, description, cover_image_url, created_at, updated_at
        FROM playlists
        WHERE id = $1
        "#,
    )
    .bind(playlist_id)
    .fetch_optional(pool)
    .await
}

/// One playlist with video, view and duration totals computed over its
/// joined videos. Dangling memberships (deleted videos) do not count.
pub async fn summary(
    pool: &PgPool,
    playlist_id: Uuid,
) -> Result<Option<PlaylistSummary>, sqlx::Error> {
    let query = format!(
        "{SUMMARY_SELECT} WHERE p.id = $1 \
         GROUP BY p.id, p.owner_id, p.name, p.description, p.cover_image_url, p.created_at"
    );
    sqlx::query_as::<_, PlaylistSummary>(&query)
        .bind(playlist_id)
        .fetch_optional(pool)
        .await
}

/// One page of a user's playlists, newest first, each with totals.
pub async fn user_playlists(
    pool: &PgPool,
    owner_id: Uuid,
    params: &PageParams,
) -> Result<(Vec<PlaylistSummary>, i64), sqlx::Error> {
    let query = format!(
        "{SUMMARY_SELECT} WHERE p.owner_id = $1 \
         GROUP BY p.id, p.owner_id, p.name, p.description, p.cover_image_url, p.created_at \
         ORDER BY p.created_at DESC LIMIT $2 OFFSET $3"
    );
    let rows = sqlx::query_as::<_, PlaylistSummary>(&query)
        .bind(owner_id)
        .bind(params.limit)
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM playlists WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

    Ok((rows, total))
}

/// Videos in a playlist in membership order, with owner summaries.
pub async fn playlist_videos(
    pool: &PgPool,
    playlist_id: Uuid,
) -> Result<Vec<VideoFeedItem>, sqlx::Error> {
    let rows = sqlx::query_as::<_, VideoWithOwnerRow>(
        r#"
        SELECT v.id, v.title, v.description, v.video_url, v.thumbnail_url,
               v.duration, v.views, v.is_published, v.created_at,
               u.id AS owner_id, u.username AS owner_username,
               u.full_name AS owner_full_name, u.avatar_url AS owner_avatar_url
        FROM playlist_videos pv
        INNER JOIN videos v ON v.id = pv.video_id
        INNER JOIN users u ON u.id = v.owner_id
        WHERE pv.playlist_id = $1
        ORDER BY pv.position ASC, pv.added_at ASC
        "#,
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn update_playlist(
    pool: &PgPool,
    playlist_id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Playlist, sqlx::Error> {
    sqlx::query_as::<_, Playlist>(
        r#"
        UPDATE playlists
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, owner_id, name, description, cover_image_url, created_at, updated_at
        "#,
    )
    .bind(playlist_id)
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn delete_playlist(pool: &PgPool, playlist_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
        .bind(playlist_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Add a video to a playlist. Re-adding the same video is a no-op and
/// returns `false`. New members go to the end of the ordering.
pub async fn add_video(
    pool: &PgPool,
    playlist_id: Uuid,
    video_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO playlist_videos (playlist_id, video_id, position)
        SELECT $1, $2, COALESCE(MAX(position), 0) + 1
        FROM playlist_videos
        WHERE playlist_id = $1
        ON CONFLICT (playlist_id, video_id) DO NOTHING
        "#,
    )
    .bind(playlist_id)
    .bind(video_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn remove_video(
    pool: &PgPool,
    playlist_id: Uuid,
    video_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2")
            .bind(playlist_id)
            .bind(video_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn contains_video(
    pool: &PgPool,
    playlist_id: Uuid,
    video_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2)",
    )
    .bind(playlist_id)
    .bind(video_id)
    .fetch_one(pool)
    .await
}
