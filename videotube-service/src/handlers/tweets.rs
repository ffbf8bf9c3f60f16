use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::{tweet_repo, user_repo};
use crate::error::{ApiError, Result};
use crate::handlers::optional_principal;
use crate::middleware::Principal;
use crate::pagination::{Page, PageQuery};
use crate::response;
use crate::services::ownership::assert_owner;

#[derive(Debug, Deserialize, Validate)]
pub struct TweetRequest {
    #[validate(length(min = 1, max = 500, message = "content must be 1-500 characters"))]
    pub content: String,
}

/// POST /api/v1/tweets
pub async fn create_tweet(
    state: web::Data<AppState>,
    principal: Principal,
    payload: web::Json<TweetRequest>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let tweet = tweet_repo::create_tweet(&state.db, principal.0, &payload.content).await?;
    Ok(response::created(tweet, "Tweet created"))
}

/// GET /api/v1/tweets/user/{userId} — paginated tweets with interaction
/// counts. Public; a bearer token personalizes `isLiked`.
pub async fn user_tweets(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    page: web::Query<PageQuery>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let owner_id = path.into_inner();
    if !user_repo::user_exists(&state.db, owner_id).await? {
        return Err(ApiError::NotFound("User not found".into()));
    }

    let viewer = optional_principal(&req, &state);
    let params = page.normalize();
    let (tweets, total) = tweet_repo::user_tweets(&state.db, owner_id, viewer, &params).await?;
    Ok(response::ok(Page::new(tweets, &params, total)))
}

/// GET /api/v1/tweets/{id} — tweet with owner summary and like/comment
/// counts. Public; a bearer token personalizes `isLiked`.
pub async fn get_tweet(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let viewer = optional_principal(&req, &state);
    let tweet = tweet_repo::detail(&state.db, path.into_inner(), viewer)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tweet not found".into()))?;
    Ok(response::ok(tweet))
}

/// PATCH /api/v1/tweets/{id} — owner-only edit.
pub async fn update_tweet(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
    payload: web::Json<TweetRequest>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let tweet_id = path.into_inner();
    let tweet = tweet_repo::find_tweet_by_id(&state.db, tweet_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tweet not found".into()))?;
    assert_owner(tweet.owner_id, principal.0, "tweet")?;

    let updated = tweet_repo::update_tweet(&state.db, tweet_id, &payload.content).await?;
    Ok(response::ok_message(updated, "Tweet updated"))
}

/// DELETE /api/v1/tweets/{id} — owner-only. Likes and comments pointing
/// at the tweet stay in place and drop out of read-time joins.
pub async fn delete_tweet(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let tweet_id = path.into_inner();
    let tweet = tweet_repo::find_tweet_by_id(&state.db, tweet_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tweet not found".into()))?;
    assert_owner(tweet.owner_id, principal.0, "tweet")?;

    tweet_repo::delete_tweet(&state.db, tweet_id).await?;
    Ok(response::ok_message(
        json!({ "deleted": true }),
        "Tweet deleted",
    ))
}
