use actix_web::HttpResponse;
use serde_json::json;

use crate::response;

/// GET /health — liveness only; does not touch the database.
pub async fn health() -> HttpResponse {
    response::ok_message(
        json!({ "status": "ok", "service": "videotube-service" }),
        "Service healthy",
    )
}
