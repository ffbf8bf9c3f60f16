use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::video_repo;
use crate::error::{ApiError, Result};
use crate::handlers::optional_principal;
use crate::middleware::Principal;
use crate::pagination::{Page, PageQuery};
use crate::response;
use crate::services::ownership::assert_owner;
use crate::services::storage::{asset_id_from_url, AssetKind};

#[derive(Debug, Deserialize)]
pub struct FeedFilter {
    #[serde(rename = "userId")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SearchFilter {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PublishVideoRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 5000, message = "description must be 1-5000 characters"))]
    pub description: String,
    #[validate(length(min = 1, message = "videoLocalPath is required"))]
    pub video_local_path: String,
    #[validate(length(min = 1, message = "thumbnailLocalPath is required"))]
    pub thumbnail_local_path: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateThumbnailRequest {
    #[validate(length(min = 1, message = "thumbnailLocalPath is required"))]
    pub thumbnail_local_path: String,
}

/// GET /api/v1/videos — published feed, optionally filtered to one owner.
pub async fn list_videos(
    state: web::Data<AppState>,
    page: web::Query<PageQuery>,
    filter: web::Query<FeedFilter>,
) -> Result<HttpResponse> {
    let params = page.normalize();
    let (items, total) = video_repo::feed(&state.db, filter.user_id, &params).await?;
    Ok(response::ok(Page::new(items, &params, total)))
}

/// GET /api/v1/videos/search — full-text search over published videos.
/// An empty term falls back to the default feed.
pub async fn search_videos(
    state: web::Data<AppState>,
    page: web::Query<PageQuery>,
    filter: web::Query<SearchFilter>,
) -> Result<HttpResponse> {
    let params = page.normalize();
    let term = filter.query.as_deref().map(str::trim).unwrap_or("");

    let (items, total) = if term.is_empty() {
        video_repo::feed(&state.db, None, &params).await?
    } else {
        video_repo::search(&state.db, term, &params).await?
    };

    Ok(response::ok(Page::new(items, &params, total)))
}

/// GET /api/v1/videos/{id} — single video with like aggregation. Public;
/// a valid bearer token personalizes `isLiked`. Unpublished videos are
/// visible to their owner only.
pub async fn get_video(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    let principal = optional_principal(&req, &state);

    let detail = video_repo::detail(&state.db, video_id, principal)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".into()))?;

    if !detail.video.is_published && principal != Some(detail.video.owner_id) {
        return Err(ApiError::NotFound("Video not found".into()));
    }

    Ok(response::ok(detail))
}

/// POST /api/v1/videos — publish a new video. The asset files are staged
/// locally by the upload front end; this uploads them to object storage,
/// probes the duration, and creates the record.
pub async fn publish_video(
    state: web::Data<AppState>,
    principal: Principal,
    payload: web::Json<PublishVideoRequest>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let video_asset = state
        .storage
        .upload(&payload.video_local_path, AssetKind::Video)
        .await?;
    let thumbnail_asset = state
        .storage
        .upload(&payload.thumbnail_local_path, AssetKind::Image)
        .await?;

    let video = video_repo::create_video(
        &state.db,
        principal.0,
        &payload.title,
        &payload.description,
        &video_asset.url,
        &thumbnail_asset.url,
        video_asset.duration,
    )
    .await?;

    tracing::info!(video_id = %video.id, owner_id = %principal.0, "video published");

    Ok(response::created(video, "Video published"))
}

/// PATCH /api/v1/videos/{id} — owner-only title/description update.
pub async fn update_video(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateVideoRequest>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    if payload.title.is_none() && payload.description.is_none() {
        return Err(ApiError::Validation(
            "At least one of title or description is required".into(),
        ));
    }

    let video_id = path.into_inner();
    let video = video_repo::find_video_by_id(&state.db, video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".into()))?;
    assert_owner(video.owner_id, principal.0, "video")?;

    let updated = video_repo::update_video(
        &state.db,
        video_id,
        payload.title.as_deref(),
        payload.description.as_deref(),
    )
    .await?;

    Ok(response::ok_message(updated, "Video updated"))
}

/// PATCH /api/v1/videos/{id}/thumbnail — owner-only thumbnail swap. The
/// old thumbnail is deleted from storage on a best-effort basis.
pub async fn update_thumbnail(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateThumbnailRequest>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let video_id = path.into_inner();
    let video = video_repo::find_video_by_id(&state.db, video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".into()))?;
    assert_owner(video.owner_id, principal.0, "video")?;

    let asset = state
        .storage
        .upload(&payload.thumbnail_local_path, AssetKind::Image)
        .await?;
    let updated = video_repo::set_thumbnail(&state.db, video_id, &asset.url).await?;

    if let Some(old_id) = asset_id_from_url(&video.thumbnail_url) {
        if let Err(e) = state.storage.delete(old_id, AssetKind::Image).await {
            tracing::warn!(video_id = %video_id, error = %e, "failed to delete old thumbnail");
        }
    }

    Ok(response::ok_message(updated, "Thumbnail updated"))
}

/// DELETE /api/v1/videos/{id} — owner-only. Stored assets are removed on
/// a best-effort basis; likes and comments pointing at the video stay in
/// place and drop out of read-time joins.
pub async fn delete_video(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    let video = video_repo::find_video_by_id(&state.db, video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".into()))?;
    assert_owner(video.owner_id, principal.0, "video")?;

    video_repo::delete_video(&state.db, video_id).await?;

    for (url, kind) in [
        (&video.video_url, AssetKind::Video),
        (&video.thumbnail_url, AssetKind::Image),
    ] {
        if let Some(asset_id) = asset_id_from_url(url) {
            if let Err(e) = state.storage.delete(asset_id, kind).await {
                tracing::warn!(video_id = %video_id, error = %e, "failed to delete asset");
            }
        }
    }

    tracing::info!(video_id = %video_id, "video deleted");

    Ok(response::ok_message(json!({ "deleted": true }), "Video deleted"))
}

/// POST /api/v1/videos/{id}/toggle-publish — owner-only visibility flip.
pub async fn toggle_publish(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    let video = video_repo::find_video_by_id(&state.db, video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".into()))?;
    assert_owner(video.owner_id, principal.0, "video")?;

    let updated = video_repo::toggle_publish(&state.db, video_id).await?;
    let message = if updated.is_published {
        "Video published"
    } else {
        "Video unpublished"
    };

    Ok(response::ok_message(
        json!({ "isPublished": updated.is_published }),
        message,
    ))
}

/// POST /api/v1/videos/{id}/view — bump the view counter.
pub async fn record_view(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    if !video_repo::video_exists(&state.db, video_id).await? {
        return Err(ApiError::NotFound("Video not found".into()));
    }
    let views = video_repo::increment_views(&state.db, video_id).await?;
    Ok(response::ok(json!({ "views": views })))
}
