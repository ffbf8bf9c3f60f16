use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;

/// Uniform success envelope: `{ success, statusCode, data, message }`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub status_code: u16,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            success: status.is_success(),
            status_code: status.as_u16(),
            data,
            message: message.into(),
        }
    }
}

/// 200 OK with an empty message.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::new(StatusCode::OK, data, ""))
}

/// 200 OK with a human-readable message.
pub fn ok_message<T: Serialize>(data: T, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::new(StatusCode::OK, data, message))
}

/// 201 Created.
pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::new(StatusCode::CREATED, data, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_uses_camel_case_keys() {
        let body = ApiResponse::new(StatusCode::OK, serde_json::json!({"x": 1}), "done");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["data"]["x"], 1);
        assert_eq!(json["message"], "done");
    }
}
