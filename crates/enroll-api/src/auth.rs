//! Caller identity.
//!
//! Authentication happens at the gateway in front of this service. The
//! gateway forwards the verified user id in `x-user-id`; `forwarded_identity`
//! moves it into request extensions and `RequireAuth` reads it back.
//!
//! ```text
//! gateway → forwarded_identity → AuthenticatedUser in extensions
//!                                        ↓
//!                         handler ← RequireAuth extractor
//! ```

use crate::handlers::ApiResponse;
use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};

/// Header carrying the gateway-verified user id
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
}

/// Middleware placing the forwarded identity into request extensions.
pub async fn forwarded_identity(mut request: Request, next: Next) -> Response {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from);

    if let Some(id) = user_id {
        request.extensions_mut().insert(AuthenticatedUser { id });
    }

    next.run(request).await
}

/// Extractor that requires an authenticated caller; 401 otherwise.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ApiResponse::failure("Authentication required")),
                )
            })
    }
}
