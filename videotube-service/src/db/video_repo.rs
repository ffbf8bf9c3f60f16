use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::models::{
    ChannelStats, DashboardVideo, OwnerSummary, UploadStatus, Video, VideoDetail, VideoFeedItem,
};
use crate::pagination::PageParams;

const VIDEO_COLUMNS: &str = "id, owner_id, title, description, video_url, thumbnail_url, \
     duration, views, is_published, upload_status, upload_error, created_at, updated_at";

/// Flat row for feed queries; folded into `VideoFeedItem` with a nested
/// owner summary.
#[derive(sqlx::FromRow)]
pub(crate) struct VideoWithOwnerRow {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) video_url: String,
    pub(crate) thumbnail_url: String,
    pub(crate) duration: f64,
    pub(crate) views: i64,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) owner_id: Uuid,
    pub(crate) owner_username: String,
    pub(crate) owner_full_name: String,
    pub(crate) owner_avatar_url: Option<String>,
}

impl From<VideoWithOwnerRow> for VideoFeedItem {
    fn from(row: VideoWithOwnerRow) -> Self {
        VideoFeedItem {
            id: row.id,
            title: row.title,
            description: row.description,
            video_url: row.video_url,
            thumbnail_url: row.thumbnail_url,
            duration: row.duration,
            views: row.views,
            is_published: row.is_published,
            created_at: row.created_at,
            owner: OwnerSummary {
                id: row.owner_id,
                username: row.owner_username,
                full_name: row.owner_full_name,
                avatar_url: row.owner_avatar_url,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct VideoDetailRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    description: String,
    video_url: String,
    thumbnail_url: String,
    duration: f64,
    views: i64,
    is_published: bool,
    upload_status: UploadStatus,
    upload_error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    like_count: i64,
    is_liked: bool,
}

pub async fn create_video(
    pool: &PgPool,
    owner_id: Uuid,
    title: &str,
    description: &str,
    video_url: &str,
    thumbnail_url: &str,
    duration: f64,
) -> Result<Video, sqlx::Error> {
    sqlx::query_as::<_, Video>(&format!(
        r#"
        INSERT INTO videos (owner_id, title, description, video_url, thumbnail_url,
                            duration, upload_status)
        VALUES ($1, $2, $3, $4, $5, $6, 'published')
        RETURNING {VIDEO_COLUMNS}
        "#
    ))
    .bind(owner_id)
    .bind(title)
    .bind(description)
    .bind(video_url)
    .bind(thumbnail_url)
    .bind(duration)
    .fetch_one(pool)
    .await
}

pub async fn find_video_by_id(
    pool: &PgPool,
    video_id: Uuid,
) -> Result<Option<Video>, sqlx::Error> {
    sqlx::query_as::<_, Video>(&format!(
        "SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1"
    ))
    .bind(video_id)
    .fetch_optional(pool)
    .await
}

pub async fn video_exists(pool: &PgPool, video_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1)")
        .bind(video_id)
        .fetch_one(pool)
        .await
}

pub async fn update_video(
    pool: &PgPool,
    video_id: Uuid,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<Video, sqlx::Error> {
    sqlx::query_as::<_, Video>(&format!(
        r#"
        UPDATE videos
        SET title = COALESCE($2, title),
            description = COALESCE($3, description),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {VIDEO_COLUMNS}
        "#
    ))
    .bind(video_id)
    .bind(title)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn set_thumbnail(
    pool: &PgPool,
    video_id: Uuid,
    thumbnail_url: &str,
) -> Result<Video, sqlx::Error> {
    sqlx::query_as::<_, Video>(&format!(
        r#"
        UPDATE videos
        SET thumbnail_url = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {VIDEO_COLUMNS}
        "#
    ))
    .bind(video_id)
    .bind(thumbnail_url)
    .fetch_one(pool)
    .await
}

/// Edges targeting the video are left in place; joins filter them out.
pub async fn delete_video(pool: &PgPool, video_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM videos WHERE id = $1")
        .bind(video_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn toggle_publish(pool: &PgPool, video_id: Uuid) -> Result<Video, sqlx::Error> {
    sqlx::query_as::<_, Video>(&format!(
        r#"
        UPDATE videos
        SET is_published = NOT is_published, updated_at = NOW()
        WHERE id = $1
        RETURNING {VIDEO_COLUMNS}
        "#
    ))
    .bind(video_id)
    .fetch_one(pool)
    .await
}

pub async fn increment_views(pool: &PgPool, video_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "UPDATE videos SET views = views + 1 WHERE id = $1 RETURNING views",
    )
    .bind(video_id)
    .fetch_one(pool)
    .await
}

/// Published-video feed, optionally restricted to one owner, with the
/// owner summary joined in.
pub async fn feed(
    pool: &PgPool,
    owner_id: Option<Uuid>,
    params: &PageParams,
) -> Result<(Vec<VideoFeedItem>, i64), sqlx::Error> {
    let owner_filter = if owner_id.is_some() {
        "AND v.owner_id = $3"
    } else {
        ""
    };

    let query = format!(
        r#"
        SELECT v.id, v.title, v.description, v.video_url, v.thumbnail_url,
               v.duration, v.views, v.is_published, v.created_at,
               u.id AS owner_id, u.username AS owner_username,
               u.full_name AS owner_full_name, u.avatar_url AS owner_avatar_url
        FROM videos v
        INNER JOIN users u ON u.id = v.owner_id
        WHERE v.is_published = TRUE {owner_filter}
        ORDER BY v.{sort} {dir}
        LIMIT $1 OFFSET $2
        "#,
        owner_filter = owner_filter,
        sort = params.sort_by.as_column(),
        dir = params.sort_order.as_sql(),
    );

    let mut select = sqlx::query_as::<_, VideoWithOwnerRow>(&query)
        .bind(params.limit)
        .bind(params.offset());
    if let Some(owner) = owner_id {
        select = select.bind(owner);
    }
    let rows = select.fetch_all(pool).await?;

    let count_query = format!(
        "SELECT COUNT(*) FROM videos v WHERE v.is_published = TRUE {}",
        if owner_id.is_some() {
            "AND v.owner_id = $1"
        } else {
            ""
        }
    );
    let mut count = sqlx::query_scalar::<_, i64>(&count_query);
    if let Some(owner) = owner_id {
        count = count.bind(owner);
    }
    let total = count.fetch_one(pool).await?;

    Ok((rows.into_iter().map(Into::into).collect(), total))
}

/// Full-text search over title + description, published videos only.
pub async fn search(
    pool: &PgPool,
    term: &str,
    params: &PageParams,
) -> Result<(Vec<VideoFeedItem>, i64), sqlx::Error> {
    let query = format!(
        r#"
        SELECT v.id, v.title, v.description, v.video_url, v.thumbnail_url,
               v.duration, v.views, v.is_published, v.created_at,
               u.id AS owner_id, u.username AS owner_username,
               u.full_name AS owner_full_name, u.avatar_url AS owner_avatar_url
        FROM videos v
        INNER JOIN users u ON u.id = v.owner_id
        WHERE v.is_published = TRUE
          AND to_tsvector('english', v.title || ' ' || v.description)
              @@ plainto_tsquery('english', $1)
        ORDER BY v.{sort} {dir}
        LIMIT $2 OFFSET $3
        "#,
        sort = params.sort_by.as_column(),
        dir = params.sort_order.as_sql(),
    );

    let rows = sqlx::query_as::<_, VideoWithOwnerRow>(&query)
        .bind(term)
        .bind(params.limit)
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM videos v
        WHERE v.is_published = TRUE
          AND to_tsvector('english', v.title || ' ' || v.description)
              @@ plainto_tsquery('english', $1)
        "#,
    )
    .bind(term)
    .fetch_one(pool)
    .await?;

    Ok((rows.into_iter().map(Into::into).collect(), total))
}

/// One video with like count and, when a principal is known, whether that
/// principal has liked it. Counts come from the edge table every time.
pub async fn detail(
    pool: &PgPool,
    video_id: Uuid,
    principal: Option<Uuid>,
) -> Result<Option<VideoDetail>, sqlx::Error> {
    let row = sqlx::query_as::<_, VideoDetailRow>(
        r#"
        SELECT v.id, v.owner_id, v.title, v.description, v.video_url,
               v.thumbnail_url, v.duration, v.views, v.is_published,
               v.upload_status, v.upload_error, v.created_at, v.updated_at,
               (SELECT COUNT(*) FROM likes l WHERE l.video_id = v.id) AS like_count,
               EXISTS(
                   SELECT 1 FROM likes l
                   WHERE l.video_id = v.id AND l.liker_id = $2
               ) AS is_liked
        FROM videos v
        WHERE v.id = $1
        "#,
    )
    .bind(video_id)
    .bind(principal)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| VideoDetail {
        video: Video {
            id: r.id,
            owner_id: r.owner_id,
            title: r.title,
            description: r.description,
            video_url: r.video_url,
            thumbnail_url: r.thumbnail_url,
            duration: r.duration,
            views: r.views,
            is_published: r.is_published,
            upload_status: r.upload_status,
            upload_error: r.upload_error,
            created_at: r.created_at,
            updated_at: r.updated_at,
        },
        like_count: r.like_count,
        is_liked: r.is_liked,
    }))
}

/// All of one owner's videos with per-video like counts, for the
/// dashboard. Includes unpublished videos.
pub async fn dashboard_videos(
    pool: &PgPool,
    owner_id: Uuid,
) -> Result<Vec<DashboardVideo>, sqlx::Error> {
    let rows = sqlx::query_as::<_, VideoDetailRow>(
        r#"
        SELECT v.id, v.owner_id, v.title, v.description, v.video_url,
               v.thumbnail_url, v.duration, v.views, v.is_published,
               v.upload_status, v.upload_error, v.created_at, v.updated_at,
               (SELECT COUNT(*) FROM likes l WHERE l.video_id = v.id) AS like_count,
               FALSE AS is_liked
        FROM videos v
        WHERE v.owner_id = $1
        ORDER BY v.created_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| DashboardVideo {
            video: Video {
                id: r.id,
                owner_id: r.owner_id,
                title: r.title,
                description: r.description,
                video_url: r.video_url,
                thumbnail_url: r.thumbnail_url,
                duration: r.duration,
                views: r.views,
                is_published: r.is_published,
                upload_status: r.upload_status,
                upload_error: r.upload_error,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
            like_count: r.like_count,
        })
        .collect())
}

/// Channel-wide aggregates in one round trip: subscriber count plus video,
/// view, like and comment totals across all of the channel's videos.
pub async fn channel_stats(pool: &PgPool, user_id: Uuid) -> Result<ChannelStats, sqlx::Error> {
    sqlx::query_as::<_, ChannelStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = $1)
                AS subscribers_count,
            COUNT(v.id) AS total_videos,
            COALESCE(SUM(v.views), 0)::BIGINT AS total_views,
            COALESCE(SUM((SELECT COUNT(*) FROM likes l WHERE l.video_id = v.id)), 0)::BIGINT
                AS total_likes,
            COALESCE(SUM((SELECT COUNT(*) FROM comments c WHERE c.video_id = v.id)), 0)::BIGINT
                AS total_comments
        FROM videos v
        WHERE v.owner_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}
