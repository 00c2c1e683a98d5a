/**
 * Signup Handler
 *
 * POST /api/auth/signup
 *
 * # Registration Process
 *
 * 1. Validate username, email, password and Instagram handle
 * 2. Hash password using bcrypt (cost from `ServerConfig::bcrypt_cost`)
 * 3. Insert the user; a taken username or email is a 409
 * 4. Return a JWT token and the user info
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::{AuthResponse, SignupRequest};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::User;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::ApiJson;
use crate::backend::server::state::AppState;
use crate::shared::SharedError;

/// Validate username format
///
/// Usernames must be:
/// - 3-30 characters long
/// - Contain only alphanumeric characters and underscores
/// - Start with a letter
fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();

    // First character must be a letter
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strip the leading `@` and surrounding whitespace; blank means none
fn normalize_handle(handle: Option<String>) -> Result<Option<String>, SharedError> {
    let Some(handle) = handle else {
        return Ok(None);
    };
    let handle = handle.trim().trim_start_matches('@');
    if handle.is_empty() {
        return Ok(None);
    }
    let valid = handle.len() <= 30
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if !valid {
        return Err(SharedError::validation(
            "instagramHandle",
            "Instagram handle may contain only letters, numbers, '.' and '_' (max 30)",
        ));
    }
    Ok(Some(handle.to_string()))
}

fn validate(request: &SignupRequest) -> Result<(), SharedError> {
    if !is_valid_username(&request.username) {
        return Err(SharedError::validation(
            "username",
            "Username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        ));
    }
    if !request.email.contains('@') {
        return Err(SharedError::validation("email", "Invalid email format"));
    }
    if request.password.len() < 8 {
        return Err(SharedError::validation(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    Ok(())
}

/// Sign up handler
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> BackendResult<Json<AuthResponse>> {
    tracing::info!("Signup request for username: {}", request.username);

    validate(&request).inspect_err(|e| tracing::warn!("Signup rejected: {}", e))?;
    let instagram_handle = normalize_handle(request.instagram_handle)?;

    let password_hash = bcrypt::hash(&request.password, state.config.bcrypt_cost)?;
    let user = state
        .stores
        .users
        .insert(User::new(
            request.username,
            request.email,
            password_hash,
            instagram_handle,
        ))
        .await
        .map_err(|e| {
            tracing::warn!("Failed to create user: {}", e);
            BackendError::from(e)
        })?;

    let token = create_token(&user, &state.config.jwt_secret)?;

    tracing::info!("User created successfully: {}", user.username);

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(is_valid_username("kelly_s"));
        assert!(!is_valid_username("ks"));
        assert!(!is_valid_username("1kelly"));
        assert!(!is_valid_username("kelly slater"));
        assert!(!is_valid_username(&"k".repeat(31)));
    }

    #[test]
    fn test_normalize_handle() {
        assert_eq!(normalize_handle(None).unwrap(), None);
        assert_eq!(normalize_handle(Some("  ".into())).unwrap(), None);
        assert_eq!(
            normalize_handle(Some("@kelly.slater".into())).unwrap(),
            Some("kelly.slater".into())
        );
        assert!(normalize_handle(Some("not a handle".into())).is_err());
    }

    #[test]
    fn test_validate_request() {
        let request = SignupRequest {
            username: "kelly".into(),
            email: "kelly.example.com".into(),
            password: "password123".into(),
            instagram_handle: None,
        };
        assert!(validate(&request).is_err());

        let request = SignupRequest {
            email: "kelly@example.com".into(),
            password: "short".into(),
            ..request
        };
        assert!(validate(&request).is_err());
    }
}
