use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::subscription_repo;
use crate::error::Result;
use crate::handlers::optional_principal;
use crate::middleware::Principal;
use crate::pagination::{Page, PageQuery};
use crate::response;
use crate::services::toggle;

/// POST /api/v1/subscriptions/toggle/{channelId}
pub async fn toggle_subscription(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let channel_id = path.into_inner();
    let outcome = toggle::toggle_subscription(
        &state.db,
        &state.config.policy,
        principal.0,
        channel_id,
    )
    .await?;

    let message = if outcome.active {
        "Subscribed"
    } else {
        "Unsubscribed"
    };
    Ok(response::ok_message(
        json!({ "isSubscribed": outcome.active }),
        message,
    ))
}

/// GET /api/v1/subscriptions/{channelId}/subscribers — public paginated
/// list of a channel's subscribers with the channel's total.
pub async fn channel_subscribers(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let channel_id = path.into_inner();
    let params = page.normalize();
    let (subscribers, total) =
        subscription_repo::subscribers(&state.db, channel_id, &params).await?;
    Ok(response::ok(json!({
        "subscribers": Page::new(subscribers, &params, total),
        "subsCount": total,
    })))
}

/// GET /api/v1/subscriptions/{subscriberId}/channels — paginated channels
/// a user subscribes to, each with its own subscriber count. A valid
/// bearer token personalizes `isSubscribed` to the viewer; anonymous
/// viewers see it relative to the listed subscriber.
pub async fn subscribed_channels(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    page: web::Query<PageQuery>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let subscriber_id = path.into_inner();
    let viewer_id = optional_principal(&req, &state).unwrap_or(subscriber_id);
    let params = page.normalize();
    let (channels, total) =
        subscription_repo::subscribed_channels(&state.db, subscriber_id, viewer_id, &params)
            .await?;
    Ok(response::ok(Page::new(channels, &params, total)))
}
