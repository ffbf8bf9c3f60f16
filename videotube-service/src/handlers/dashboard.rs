use actix_web::{web, HttpResponse};

use crate::app_state::AppState;
use crate::db::video_repo;
use crate::error::Result;
use crate::middleware::Principal;
use crate::response;

/// GET /api/v1/dashboard/stats — the principal's channel statistics,
/// all derived from edges and entities at read time.
pub async fn channel_stats(
    state: web::Data<AppState>,
    principal: Principal,
) -> Result<HttpResponse> {
    let stats = video_repo::channel_stats(&state.db, principal.0).await?;
    Ok(response::ok(stats))
}

/// GET /api/v1/dashboard/videos — all of the principal's videos,
/// published or not, with per-video like counts.
pub async fn channel_videos(
    state: web::Data<AppState>,
    principal: Principal,
) -> Result<HttpResponse> {
    let videos = video_repo::dashboard_videos(&state.db, principal.0).await?;
    Ok(response::ok(videos))
}
