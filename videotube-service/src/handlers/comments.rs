use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::{comment_repo, tweet_repo, video_repo};
use crate::domain::models::CommentTarget;
use crate::error::{ApiError, Result};
use crate::middleware::Principal;
use crate::pagination::{Page, PageQuery};
use crate::response;
use crate::services::ownership::assert_owner;

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 2000, message = "content must be 1-2000 characters"))]
    pub content: String,
}

async fn ensure_target_exists(state: &AppState, target: CommentTarget) -> Result<()> {
    let exists = match target {
        CommentTarget::Video(id) => video_repo::video_exists(&state.db, id).await?,
        CommentTarget::Tweet(id) => tweet_repo::tweet_exists(&state.db, id).await?,
    };
    if !exists {
        let what = match target {
            CommentTarget::Video(_) => "Video",
            CommentTarget::Tweet(_) => "Tweet",
        };
        return Err(ApiError::NotFound(format!("{what} not found")));
    }
    Ok(())
}

async fn list_thread(
    state: &AppState,
    target: CommentTarget,
    page: &PageQuery,
) -> Result<HttpResponse> {
    ensure_target_exists(state, target).await?;
    let params = page.normalize();
    let (items, total) = comment_repo::thread(&state.db, target, &params).await?;
    Ok(response::ok(Page::new(items, &params, total)))
}

async fn create_on_target(
    state: &AppState,
    principal: Principal,
    target: CommentTarget,
    payload: &CommentRequest,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    ensure_target_exists(state, target).await?;

    let comment =
        comment_repo::create_comment(&state.db, principal.0, target, &payload.content).await?;
    Ok(response::created(comment, "Comment added"))
}

/// GET /api/v1/videos/{id}/comments — paginated thread, newest first.
pub async fn video_comments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    list_thread(&state, CommentTarget::Video(path.into_inner()), &page).await
}

/// POST /api/v1/videos/{id}/comments
pub async fn comment_on_video(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
    payload: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    create_on_target(&state, principal, CommentTarget::Video(path.into_inner()), &payload).await
}

/// GET /api/v1/tweets/{id}/comments
pub async fn tweet_comments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    list_thread(&state, CommentTarget::Tweet(path.into_inner()), &page).await
}

/// POST /api/v1/tweets/{id}/comments
pub async fn comment_on_tweet(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
    payload: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    create_on_target(&state, principal, CommentTarget::Tweet(path.into_inner()), &payload).await
}

/// PATCH /api/v1/comments/{id} — owner-only edit.
pub async fn update_comment(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
    payload: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let comment_id = path.into_inner();
    let comment = comment_repo::find_comment_by_id(&state.db, comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".into()))?;
    assert_owner(comment.owner_id, principal.0, "comment")?;

    let updated = comment_repo::update_comment(&state.db, comment_id, &payload.content).await?;
    Ok(response::ok_message(updated, "Comment updated"))
}

/// DELETE /api/v1/comments/{id} — owner-only. Likes pointing at the
/// comment stay in place and drop out of read-time joins.
pub async fn delete_comment(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comment_id = path.into_inner();
    let comment = comment_repo::find_comment_by_id(&state.db, comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".into()))?;
    assert_owner(comment.owner_id, principal.0, "comment")?;

    comment_repo::delete_comment(&state.db, comment_id).await?;
    Ok(response::ok_message(
        json!({ "deleted": true }),
        "Comment deleted",
    ))
}
