/**
 * Login Handler
 *
 * POST /api/auth/login
 *
 * # Authentication Process
 *
 * 1. Look up the user by email (if the login contains `@`) or username
 * 2. Verify password using bcrypt
 * 3. Record the login session from the `User-Agent` header
 * 4. Return a JWT token and the user info
 *
 * Unknown users and wrong passwords get the same 401.
 */

use axum::{
    extract::State,
    http::{header::USER_AGENT, HeaderMap},
    response::Json,
};
use chrono::Utc;

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{SessionEntry, MAX_SESSION_HISTORY};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::ApiJson;
use crate::backend::server::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Login handler
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<LoginRequest>,
) -> BackendResult<Json<AuthResponse>> {
    tracing::info!("Login request for: {}", request.username);

    let users = &state.stores.users;
    let user = if request.username.contains('@') {
        users.find_by_email(&request.username).await?
    } else {
        users.find_by_username(&request.username).await?
    };

    let user = user.ok_or_else(|| {
        tracing::warn!("User not found: {}", request.username);
        BackendError::unauthorized(INVALID_CREDENTIALS)
    })?;

    if !bcrypt::verify(&request.password, &user.password_hash)? {
        tracing::warn!("Invalid password for user: {}", request.username);
        return Err(BackendError::unauthorized(INVALID_CREDENTIALS));
    }

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown");
    let user = users
        .record_session(
            &user.id,
            SessionEntry::from_user_agent(user_agent, Utc::now()),
            MAX_SESSION_HISTORY,
        )
        .await?;

    let token = create_token(&user, &state.config.jwt_secret)?;

    tracing::info!("User logged in successfully: {}", user.username);

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}
