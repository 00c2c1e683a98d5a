/**
 * Authentication Extractors
 *
 * Axum extractors that identify the caller of a request:
 *
 * - `AuthUser` - verified JWT claims from `Authorization: Bearer <token>`
 * - `UserIdHeader` - the `x-user-id` header sent with message edits
 * - `UserEmailHeader` - the `x-user-email` header sent with message deletes
 *
 * Missing or invalid credentials reject the request with 401.
 */

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderName},
};

use crate::backend::auth::sessions::{verify_token, Claims};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Header carrying the acting user's id
pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// Header carrying the acting user's email
pub const USER_EMAIL_HEADER: HeaderName = HeaderName::from_static("x-user-email");

/// Claims of a verified bearer token
#[derive(Clone, Debug)]
pub struct AuthUser(pub Claims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                tracing::warn!("Missing Authorization header");
                BackendError::unauthorized("Missing Authorization header")
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            tracing::warn!("Invalid Authorization header format");
            BackendError::unauthorized("Invalid Authorization header format")
        })?;

        let claims = verify_token(token, &state.config.jwt_secret).map_err(|e| {
            tracing::warn!("Invalid token: {:?}", e);
            BackendError::unauthorized("Invalid token")
        })?;

        Ok(AuthUser(claims))
    }
}

/// Read a non-empty header value
fn required_header(parts: &Parts, name: &HeaderName) -> Result<String, BackendError> {
    parts
        .headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            tracing::warn!("Missing {} header", name);
            BackendError::unauthorized(format!("Missing {} header", name))
        })
}

/// The `x-user-id` header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserIdHeader(pub String);

impl<S: Send + Sync> FromRequestParts<S> for UserIdHeader {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        required_header(parts, &USER_ID_HEADER).map(UserIdHeader)
    }
}

/// The `x-user-email` header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserEmailHeader(pub String);

impl<S: Send + Sync> FromRequestParts<S> for UserEmailHeader {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        required_header(parts, &USER_EMAIL_HEADER).map(UserEmailHeader)
    }
}
