/**
 * API Route Handlers
 *
 * This module wires the JSON endpoints and the chat socket into the router.
 *
 * # Routes
 *
 * ## Groups
 * - `POST /api/groups/create` - Create a password-protected group
 * - `POST /api/groups/change-password` - Creator or admin
 * - `POST /api/groups/join` - Check the password, optionally add the user
 * - `GET  /api/groups/list` - All groups
 * - `GET  /api/groups/membership` - Membership check
 * - `POST /api/groups/remove-member` - Admin only
 * - `POST /api/groups/rename` - Admin only
 * - `POST /api/groups/delete` - Admin only
 *
 * ## Messages
 * - `GET    /api/messages` - One day of history
 * - `PUT    /api/messages/{id}` - Author edit within the window
 * - `DELETE /api/messages/{id}` - Admin delete
 * - `POST   /api/messages/{id}/reactions` - Toggle a reaction
 *
 * ## Authentication
 * - `POST /api/auth/signup` - User registration
 * - `POST /api/auth/login` - User login
 * - `GET  /api/auth/me` - Current user info
 *
 * ## Live
 * - `GET /api/socket` - WebSocket upgrade
 */

use axum::routing::{get, post, put};
use axum::Router;

use crate::backend::auth::{get_me, login, signup};
use crate::backend::chat::handlers::{delete_message, edit_message, get_history, react_to_message};
use crate::backend::groups::handlers::{
    change_password, check_membership, create_group, delete_group, join_group, list_groups,
    remove_member, rename_group,
};
use crate::backend::realtime::socket_handler;
use crate::backend::server::state::AppState;

/// Configure group routes
pub fn configure_group_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/groups/create", post(create_group))
        .route("/api/groups/change-password", post(change_password))
        .route("/api/groups/join", post(join_group))
        .route("/api/groups/list", get(list_groups))
        .route("/api/groups/membership", get(check_membership))
        .route("/api/groups/remove-member", post(remove_member))
        .route("/api/groups/rename", post(rename_group))
        .route("/api/groups/delete", post(delete_group))
}

/// Configure message routes
///
/// Edits and deletes carry the caller in the `x-user-id` / `x-user-email`
/// headers; the handlers reject requests without them.
pub fn configure_message_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/messages", get(get_history))
        .route(
            "/api/messages/{id}",
            put(edit_message).delete(delete_message),
        )
        .route("/api/messages/{id}/reactions", post(react_to_message))
}

/// Configure API routes
///
/// # Authentication
///
/// `/api/auth/me` requires a JWT in the `Authorization` header. Signup and
/// login are public.
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    let router = configure_group_routes(router);
    let router = configure_message_routes(router);

    router
        // Authentication endpoints
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(get_me))
        // Live fan-out
        .route("/api/socket", get(socket_handler))
}
