use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::like_repo;
use crate::domain::models::LikeTarget;
use crate::error::{ApiError, Result};
use crate::middleware::Principal;
use crate::pagination::{Page, PageQuery};
use crate::response;
use crate::services::toggle;

#[derive(Debug, Deserialize)]
pub struct LikeStatusQuery {
    pub resource: String,
    pub id: Uuid,
}

fn parse_target(resource: &str, id: Uuid) -> Result<LikeTarget> {
    match resource {
        "video" => Ok(LikeTarget::Video(id)),
        "comment" => Ok(LikeTarget::Comment(id)),
        "tweet" => Ok(LikeTarget::Tweet(id)),
        other => Err(ApiError::Validation(format!(
            "Unknown like resource '{other}', expected video, comment or tweet"
        ))),
    }
}

async fn toggle_and_respond(
    state: &AppState,
    principal: Principal,
    target: LikeTarget,
) -> Result<HttpResponse> {
    let outcome = toggle::toggle_like(&state.db, principal.0, target).await?;
    let message = if outcome.active { "Liked" } else { "Unliked" };
    Ok(response::ok_message(
        json!({ "isLiked": outcome.active }),
        message,
    ))
}

/// POST /api/v1/likes/toggle/video/{videoId}
pub async fn toggle_video_like(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    toggle_and_respond(&state, principal, LikeTarget::Video(path.into_inner())).await
}

/// POST /api/v1/likes/toggle/comment/{commentId}
pub async fn toggle_comment_like(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    toggle_and_respond(&state, principal, LikeTarget::Comment(path.into_inner())).await
}

/// POST /api/v1/likes/toggle/tweet/{tweetId}
pub async fn toggle_tweet_like(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    toggle_and_respond(&state, principal, LikeTarget::Tweet(path.into_inner())).await
}

/// GET /api/v1/likes/status?resource=video&id=... — whether the principal
/// has liked the given target.
pub async fn like_status(
    state: web::Data<AppState>,
    principal: Principal,
    query: web::Query<LikeStatusQuery>,
) -> Result<HttpResponse> {
    let target = parse_target(&query.resource, query.id)?;
    let liked = like_repo::is_liked(&state.db, principal.0, target).await?;
    Ok(response::ok(json!({ "isLiked": liked })))
}

/// GET /api/v1/likes/videos — published videos the principal has liked.
pub async fn liked_videos(
    state: web::Data<AppState>,
    principal: Principal,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let params = page.normalize();
    let (videos, total) = like_repo::liked_videos(&state.db, principal.0, &params).await?;
    Ok(response::ok(Page::new(videos, &params, total)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_names_map_to_targets() {
        let id = Uuid::new_v4();
        assert_eq!(parse_target("video", id).unwrap(), LikeTarget::Video(id));
        assert_eq!(parse_target("comment", id).unwrap(), LikeTarget::Comment(id));
        assert_eq!(parse_target("tweet", id).unwrap(), LikeTarget::Tweet(id));
    }

    #[test]
    fn unknown_resource_is_a_validation_error() {
        let err = parse_target("channel", Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
