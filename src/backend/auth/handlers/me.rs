/**
 * Get Current User Handler
 *
 * GET /api/auth/me
 *
 * Requires `Authorization: Bearer <token>`. Returns the user's profile,
 * message counter and session history.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::MeResponse;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;

/// Get current user handler
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> BackendResult<Json<MeResponse>> {
    let user = state
        .stores
        .users
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::warn!("User not found: {}", claims.sub);
            BackendError::not_found("user")
        })?;

    Ok(Json(MeResponse { user: user.into() }))
}
