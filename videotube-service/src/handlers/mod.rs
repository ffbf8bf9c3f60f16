//! HTTP request handlers. Thin layer: validate input, apply the
//! ownership guard, call into db/services, wrap the result in the
//! response envelope.

pub mod comments;
pub mod dashboard;
pub mod health;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod videos;

use actix_web::HttpRequest;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::security::jwt;

/// Best-effort principal for public reads that personalize their output
/// (is_liked, is_subscribed). An absent or invalid token is just an
/// anonymous viewer, never an error.
pub(crate) fn optional_principal(req: &HttpRequest, state: &AppState) -> Option<Uuid> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());
    jwt::principal_from_header(header, &state.config.auth.jwt_secret)
}
