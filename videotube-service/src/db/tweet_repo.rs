use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::models::{OwnerSummary, Tweet, TweetView};
use crate::pagination::PageParams;

const TWEET_VIEW_SELECT: &str = r#"
    SELECT t.id, t.content, t.created_at,
           u.id AS owner_id, u.username AS owner_username,
           u.full_name AS owner_full_name, u.avatar_url AS owner_avatar_url,
           (SELECT COUNT(*) FROM likes l WHERE l.tweet_id = t.id) AS like_count,
           (SELECT COUNT(*) FROM comments c WHERE c.tweet_id = t.id) AS comment_count,
           EXISTS(
               SELECT 1 FROM likes l
               WHERE l.tweet_id = t.id AND l.liker_id = $2
           ) AS is_liked
    FROM tweets t
    INNER JOIN users u ON u.id = t.owner_id
"#;

#[derive(sqlx::FromRow)]
struct TweetViewRow {
    id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    owner_id: Uuid,
    owner_username: String,
    owner_full_name: String,
    owner_avatar_url: Option<String>,
    like_count: i64,
    comment_count: i64,
    is_liked: bool,
}

impl From<TweetViewRow> for TweetView {
    fn from(row: TweetViewRow) -> Self {
        TweetView {
            id: row.id,
            content: row.content,
            created_at: row.created_at,
            owner: OwnerSummary {
                id: row.owner_id,
                username: row.owner_username,
                full_name: row.owner_full_name,
                avatar_url: row.owner_avatar_url,
            },
            like_count: row.like_count,
            comment_count: row.comment_count,
            is_liked: row.is_liked,
        }
    }
}

pub async fn create_tweet(
    pool: &PgPool,
    owner_id: Uuid,
    content: &str,
) -> Result<Tweet, sqlx::Error> {
    sqlx::query_as::<_, Tweet>(
        r#"
        INSERT INTO tweets (owner_id, content)
        VALUES ($1, $2)
        RETURNING id, owner_id, content, created_at, updated_at
        "#,
    )
    .bind(owner_id)
    .bind(content)
    .fetch_one(pool)
    .await
}

pub async fn find_tweet_by_id(pool: &PgPool, tweet_id: Uuid) -> Result<Option<Tweet>, sqlx::Error> {
    sqlx::query_as::<_, Tweet>(
        "SELECT id, owner_id, content, created_at, updated_at FROM tweets WHERE id = $1",
    )
    .bind(tweet_id)
    .fetch_optional(pool)
    .await
}

pub async fn tweet_exists(pool: &PgPool, tweet_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM tweets WHERE id = $1)")
        .bind(tweet_id)
        .fetch_one(pool)
        .await
}

/// One page of a user's tweets, newest first, with owner summary,
/// interaction counts, and the viewer's like state.
pub async fn user_tweets(
    pool: &PgPool,
    owner_id: Uuid,
    viewer_id: Option<Uuid>,
    params: &PageParams,
) -> Result<(Vec<TweetView>, i64), sqlx::Error> {
    let query = format!(
        "{TWEET_VIEW_SELECT} WHERE t.owner_id = $1 \
         ORDER BY t.created_at DESC LIMIT $3 OFFSET $4"
    );
    let rows = sqlx::query_as::<_, TweetViewRow>(&query)
        .bind(owner_id)
        .bind(viewer_id)
        .bind(params.limit)
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tweets WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

    Ok((rows.into_iter().map(Into::into).collect(), total))
}

/// One tweet with owner summary and interaction counts; `is_liked` is
/// personalized when a viewer is known.
pub async fn detail(
    pool: &PgPool,
    tweet_id: Uuid,
    viewer_id: Option<Uuid>,
) -> Result<Option<TweetView>, sqlx::Error> {
    let query = format!("{TWEET_VIEW_SELECT} WHERE t.id = $1");
    let row = sqlx::query_as::<_, TweetViewRow>(&query)
        .bind(tweet_id)
        .bind(viewer_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(Into::into))
}

pub async fn update_tweet(
    pool: &PgPool,
    tweet_id: Uuid,
    content: &str,
) -> Result<Tweet, sqlx::Error> {
    sqlx::query_as::<_, Tweet>(
        r#"
        UPDATE tweets
        SET content = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, owner_id, content, created_at, updated_at
        "#,
    )
    .bind(tweet_id)
    .bind(content)
    .fetch_one(pool)
    .await
}

pub async fn delete_tweet(pool: &PgPool, tweet_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tweets WHERE id = $1")
        .bind(tweet_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
