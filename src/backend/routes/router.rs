/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Health check
 * 2. API routes (groups, messages, auth, socket)
 * 3. Fallback handler (JSON 404)
 *
 * # Middleware
 *
 * Requests are traced with `TraceLayer`. The web client is served from a
 * different origin, so CORS allows any origin along with the identity
 * headers the message endpoints read.
 */

use axum::http::{header, HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::backend::middleware::auth::{USER_EMAIL_HEADER, USER_ID_HEADER};
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state containing the services
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/health", get(health));

    let router = configure_api_routes(router);

    router
        .fallback(not_found)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

fn cors_layer() -> CorsLayer {
    let identity_headers: [HeaderName; 4] = [
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        USER_ID_HEADER,
        USER_EMAIL_HEADER,
    ];

    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(identity_headers)
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Not found",
            "status": StatusCode::NOT_FOUND.as_u16(),
        })),
    )
}
