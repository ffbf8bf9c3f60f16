//! Bearer token validation.
//!
//! Token issuance belongs to the identity provider; this service only
//! checks signatures and extracts the principal id from the `sub` claim.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Principal user id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sign a token for the given principal. Used by tests and local tooling;
/// production tokens come from the identity provider sharing the secret.
pub fn sign_token(user_id: Uuid, secret: &str, ttl_seconds: i64) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
}

/// Validate a bearer token and return the principal id.
pub fn validate_token(token: &str, secret: &str) -> Result<Uuid, ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("token validation failed: {}", e);
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    Uuid::parse_str(&data.claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))
}

/// Extract a principal from an Authorization header value, if present and
/// valid. Public read endpoints use this to personalize results without
/// requiring authentication.
pub fn principal_from_header(header: Option<&str>, secret: &str) -> Option<Uuid> {
    let token = header?.strip_prefix("Bearer ")?;
    validate_token(token, secret).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_validate_round_trip() {
        let user_id = Uuid::new_v4();
        let token = sign_token(user_id, "secret", 3600).unwrap();
        let principal = validate_token(&token, "secret").unwrap();
        assert_eq!(principal, user_id);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_token(Uuid::new_v4(), "secret", 3600).unwrap();
        assert!(validate_token(&token, "other-secret").is_err());
    }

    #[test]
    fn header_extraction_requires_bearer_scheme() {
        let user_id = Uuid::new_v4();
        let token = sign_token(user_id, "secret", 3600).unwrap();

        let header = format!("Bearer {token}");
        assert_eq!(
            principal_from_header(Some(&header), "secret"),
            Some(user_id)
        );
        assert_eq!(principal_from_header(Some(&token), "secret"), None);
        assert_eq!(principal_from_header(None, "secret"), None);
    }
}
