use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::{playlist_repo, video_repo};
use crate::error::{ApiError, Result};
use crate::middleware::Principal;
use crate::pagination::{Page, PageQuery};
use crate::response;
use crate::services::ownership::assert_owner;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlaylistRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePlaylistRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// POST /api/v1/playlists
pub async fn create_playlist(
    state: web::Data<AppState>,
    principal: Principal,
    payload: web::Json<CreatePlaylistRequest>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let playlist = playlist_repo::create_playlist(
        &state.db,
        principal.0,
        &payload.name,
        &payload.description,
    )
    .await?;
    Ok(response::created(playlist, "Playlist created"))
}

/// GET /api/v1/playlists/user/{userId} — paginated playlists with totals.
pub async fn user_playlists(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let params = page.normalize();
    let (playlists, total) =
        playlist_repo::user_playlists(&state.db, path.into_inner(), &params).await?;
    Ok(response::ok(Page::new(playlists, &params, total)))
}

/// GET /api/v1/playlists/{id} — playlist summary plus its videos in
/// membership order.
pub async fn get_playlist(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let playlist_id = path.into_inner();
    let summary = playlist_repo::summary(&state.db, playlist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".into()))?;
    let videos = playlist_repo::playlist_videos(&state.db, playlist_id).await?;

    Ok(response::ok(json!({
        "playlist": summary,
        "videos": videos,
    })))
}

/// PATCH /api/v1/playlists/{id} — owner-only.
pub async fn update_playlist(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
    payload: web::Json<UpdatePlaylistRequest>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    if payload.name.is_none() && payload.description.is_none() {
        return Err(ApiError::Validation(
            "At least one of name or description is required".into(),
        ));
    }

    let playlist_id = path.into_inner();
    let playlist = playlist_repo::find_playlist_by_id(&state.db, playlist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".into()))?;
    assert_owner(playlist.owner_id, principal.0, "playlist")?;

    let updated = playlist_repo::update_playlist(
        &state.db,
        playlist_id,
        payload.name.as_deref(),
        payload.description.as_deref(),
    )
    .await?;
    Ok(response::ok_message(updated, "Playlist updated"))
}

/// DELETE /api/v1/playlists/{id} — owner-only; memberships cascade.
pub async fn delete_playlist(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let playlist_id = path.into_inner();
    let playlist = playlist_repo::find_playlist_by_id(&state.db, playlist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".into()))?;
    assert_owner(playlist.owner_id, principal.0, "playlist")?;

    playlist_repo::delete_playlist(&state.db, playlist_id).await?;
    Ok(response::ok_message(
        json!({ "deleted": true }),
        "Playlist deleted",
    ))
}

/// POST /api/v1/playlists/{id}/videos/{videoId} — add to own playlist.
/// Re-adding an existing member is a no-op.
pub async fn add_video(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (playlist_id, video_id) = path.into_inner();

    let playlist = playlist_repo::find_playlist_by_id(&state.db, playlist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".into()))?;
    assert_owner(playlist.owner_id, principal.0, "playlist")?;

    if !video_repo::video_exists(&state.db, video_id).await? {
        return Err(ApiError::NotFound("Video not found".into()));
    }

    let added = playlist_repo::add_video(&state.db, playlist_id, video_id).await?;
    let message = if added {
        "Video added to playlist"
    } else {
        "Video already in playlist"
    };
    Ok(response::ok_message(json!({ "added": added }), message))
}

/// DELETE /api/v1/playlists/{id}/videos/{videoId} — remove from own
/// playlist. When the policy requires it, the caller must also own the
/// video being removed.
pub async fn remove_video(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (playlist_id, video_id) = path.into_inner();

    let playlist = playlist_repo::find_playlist_by_id(&state.db, playlist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".into()))?;
    assert_owner(playlist.owner_id, principal.0, "playlist")?;

    if !playlist_repo::contains_video(&state.db, playlist_id, video_id).await? {
        return Err(ApiError::NotFound("Video not in playlist".into()));
    }

    if state.config.policy.playlist_remove_checks_video_owner {
        if let Some(video) = video_repo::find_video_by_id(&state.db, video_id).await? {
            assert_owner(video.owner_id, principal.0, "video")?;
        }
    }

    playlist_repo::remove_video(&state.db, playlist_id, video_id).await?;
    Ok(response::ok_message(
        json!({ "removed": true }),
        "Video removed from playlist",
    ))
}
