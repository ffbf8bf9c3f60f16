//! Toggle semantics for relationship edges. One call flips the edge:
//! absent becomes present, present becomes absent. The edge tables'
//! unique constraints arbitrate concurrent toggles, so two racing calls
//! resolve to one winner per phase instead of duplicate edges.

use sqlx::PgPool;
use uuid::Uuid;

use crate::config::PolicyConfig;
use crate::db::{comment_repo, like_repo, subscription_repo, tweet_repo, user_repo, video_repo};
use crate::domain::models::LikeTarget;
use crate::error::{ApiError, Result};

/// Outcome of a toggle: whether the edge is active after the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub active: bool,
}

async fn ensure_like_target_exists(pool: &PgPool, target: LikeTarget) -> Result<()> {
    let exists = match target {
        LikeTarget::Video(id) => video_repo::video_exists(pool, id).await?,
        LikeTarget::Comment(id) => comment_repo::comment_exists(pool, id).await?,
        LikeTarget::Tweet(id) => tweet_repo::tweet_exists(pool, id).await?,
    };
    if !exists {
        return Err(ApiError::NotFound(format!(
            "{} not found",
            target.kind()
        )));
    }
    Ok(())
}

/// Flip the like edge for one principal and one target.
///
/// Insert first; when the insert loses to an existing edge, delete it
/// instead. A delete that removes nothing means another request removed
/// the edge between our two steps, which surfaces as a conflict rather
/// than silently re-inserting.
pub async fn toggle_like(
    pool: &PgPool,
    liker_id: Uuid,
    target: LikeTarget,
) -> Result<ToggleOutcome> {
    ensure_like_target_exists(pool, target).await?;

    if like_repo::insert_if_absent(pool, liker_id, target)
        .await?
        .is_some()
    {
        return Ok(ToggleOutcome { active: true });
    }

    if like_repo::delete_edge(pool, liker_id, target).await? {
        return Ok(ToggleOutcome { active: false });
    }

    Err(ApiError::Conflict(
        "Like was modified concurrently, retry".into(),
    ))
}

pub fn ensure_not_self(subscriber_id: Uuid, channel_id: Uuid, policy: &PolicyConfig) -> Result<()> {
    if subscriber_id == channel_id && !policy.allow_self_subscribe {
        return Err(ApiError::Validation(
            "Cannot subscribe to your own channel".into(),
        ));
    }
    Ok(())
}

/// Flip the subscription edge between a subscriber and a channel.
pub async fn toggle_subscription(
    pool: &PgPool,
    policy: &PolicyConfig,
    subscriber_id: Uuid,
    channel_id: Uuid,
) -> Result<ToggleOutcome> {
    ensure_not_self(subscriber_id, channel_id, policy)?;

    if !user_repo::user_exists(pool, channel_id).await? {
        return Err(ApiError::NotFound("Channel not found".into()));
    }

    if subscription_repo::insert_if_absent(pool, subscriber_id, channel_id)
        .await?
        .is_some()
    {
        return Ok(ToggleOutcome { active: true });
    }

    if subscription_repo::delete_edge(pool, subscriber_id, channel_id).await? {
        return Ok(ToggleOutcome { active: false });
    }

    Err(ApiError::Conflict(
        "Subscription was modified concurrently, retry".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;

    fn policy(allow_self_subscribe: bool) -> PolicyConfig {
        PolicyConfig {
            allow_self_subscribe,
            playlist_remove_checks_video_owner: true,
        }
    }

    #[test]
    fn self_subscribe_rejected_by_default() {
        let id = Uuid::new_v4();
        let err = ensure_not_self(id, id, &policy(false)).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn self_subscribe_allowed_when_policy_permits() {
        let id = Uuid::new_v4();
        assert!(ensure_not_self(id, id, &policy(true)).is_ok());
    }

    #[test]
    fn distinct_users_always_pass() {
        assert!(ensure_not_self(Uuid::new_v4(), Uuid::new_v4(), &policy(false)).is_ok());
    }
}
