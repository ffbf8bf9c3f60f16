/// JWT authentication middleware for Bearer token validation.
/// Extracts the principal id from JWT claims and adds it to request
/// extensions.
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::ResponseError,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::security::jwt;

/// Authenticated principal extracted from the bearer token
#[derive(Debug, Clone, Copy)]
pub struct Principal(pub Uuid);

/// JWT authentication middleware factory
#[derive(Clone)]
pub struct JwtAuth {
    secret: Rc<String>,
}

impl JwtAuth {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Rc::new(secret.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtAuthService {
            service: Rc::new(service),
            secret: self.secret.clone(),
        }))
    }
}

pub struct JwtAuthService<S> {
    service: Rc<S>,
    secret: Rc<String>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let secret = self.secret.clone();

        Box::pin(async move {
            // Extract the header to an owned String before any mutable
            // access to request extensions.
            let auth_header = match req.headers().get("Authorization") {
                Some(header) => match header.to_str() {
                    Ok(h) => h.to_string(),
                    Err(_) => {
                        return Ok(reject(
                            req,
                            ApiError::Unauthorized("Invalid Authorization header".into()),
                        ));
                    }
                },
                None => {
                    return Ok(reject(
                        req,
                        ApiError::Unauthorized("Missing Authorization header".into()),
                    ));
                }
            };

            let token = match auth_header.strip_prefix("Bearer ") {
                Some(t) => t,
                None => {
                    return Ok(reject(
                        req,
                        ApiError::Unauthorized(
                            "Invalid Authorization scheme, expected Bearer".into(),
                        ),
                    ));
                }
            };

            let user_id = match jwt::validate_token(token, &secret) {
                Ok(id) => id,
                Err(err) => return Ok(reject(req, err)),
            };

            req.extensions_mut().insert(Principal(user_id));

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// Turn an auth failure into the same response `ResponseError` would
/// produce, so the rejection is a response rather than a service error.
fn reject<B>(req: ServiceRequest, err: ApiError) -> ServiceResponse<EitherBody<B>> {
    req.into_response(err.error_response()).map_into_right_body()
}

impl FromRequest for Principal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    /// Resolve the principal either from request extensions (when the
    /// middleware ran) or by validating the bearer token directly, so
    /// individual routes inside otherwise-public scopes can require auth.
    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(principal) = req.extensions().get::<Principal>().copied() {
            return ready(Ok(principal));
        }

        let state = match req.app_data::<actix_web::web::Data<crate::app_state::AppState>>() {
            Some(state) => state,
            None => {
                return ready(Err(ApiError::Internal(
                    "Application state not configured".into(),
                )
                .into()))
            }
        };

        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok());
        match jwt::principal_from_header(header, &state.config.auth.jwt_secret) {
            Some(user_id) => ready(Ok(Principal(user_id))),
            None => ready(Err(ApiError::Unauthorized(
                "Authentication required".into(),
            )
            .into())),
        }
    }
}
