use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::models::{ChannelEntry, SubscriberEntry};
use crate::pagination::PageParams;

/// Insert the subscription edge if it does not exist. The unique
/// constraint on (subscriber_id, channel_id) arbitrates concurrent
/// inserts; the loser sees `None`.
pub async fn insert_if_absent(
    pool: &PgPool,
    subscriber_id: Uuid,
    channel_id: Uuid,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO subscriptions (subscriber_id, channel_id)
        VALUES ($1, $2)
        ON CONFLICT (subscriber_id, channel_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(subscriber_id)
    .bind(channel_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_edge(
    pool: &PgPool,
    subscriber_id: Uuid,
    channel_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2")
            .bind(subscriber_id)
            .bind(channel_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn is_subscribed(
    pool: &PgPool,
    subscriber_id: Uuid,
    channel_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2)",
    )
    .bind(subscriber_id)
    .bind(channel_id)
    .fetch_one(pool)
    .await
}

pub async fn subscriber_count(pool: &PgPool, channel_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions WHERE channel_id = $1")
        .bind(channel_id)
        .fetch_one(pool)
        .await
}

/// One page of a channel's subscribers, newest first, with the channel's
/// total subscriber count.
pub async fn subscribers(
    pool: &PgPool,
    channel_id: Uuid,
    params: &PageParams,
) -> Result<(Vec<SubscriberEntry>, i64), sqlx::Error> {
    let rows = sqlx::query_as::<_, SubscriberEntry>(
        r#"
        SELECT u.id, u.username, u.full_name, u.avatar_url,
               s.created_at AS subscribed_at
        FROM subscriptions s
        INNER JOIN users u ON u.id = s.subscriber_id
        WHERE s.channel_id = $1
        ORDER BY s.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(channel_id)
    .bind(params.limit)
    .bind(params.offset())
    .fetch_all(pool)
    .await?;

    let total = subscriber_count(pool, channel_id).await?;
    Ok((rows, total))
}

/// One page of the channels a user subscribes to, each with its own
/// subscriber count and whether the viewer is subscribed to it.
pub async fn subscribed_channels(
    pool: &PgPool,
    subscriber_id: Uuid,
    viewer_id: Uuid,
    params: &PageParams,
) -> Result<(Vec<ChannelEntry>, i64), sqlx::Error> {
    let rows = sqlx::query_as::<_, ChannelEntry>(
        r#"
        SELECT u.id, u.username, u.full_name, u.avatar_url,
               (SELECT COUNT(*) FROM subscriptions s2 WHERE s2.channel_id = u.id)
                   AS total_subs,
               EXISTS(
                   SELECT 1 FROM subscriptions s3
                   WHERE s3.channel_id = u.id AND s3.subscriber_id = $2
               ) AS is_subscribed
        FROM subscriptions s
        INNER JOIN users u ON u.id = s.channel_id
        WHERE s.subscriber_id = $1
        ORDER BY s.created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(subscriber_id)
    .bind(viewer_id)
    .bind(params.limit)
    .bind(params.offset())
    .fetch_all(pool)
    .await?;

    let total =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = $1")
            .bind(subscriber_id)
            .fetch_one(pool)
            .await?;
    Ok((rows, total))
}
