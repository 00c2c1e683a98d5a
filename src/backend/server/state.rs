/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` holds:
 * - The server configuration
 * - The repositories (`Stores`)
 * - The room broadcaster shared by every service and socket
 * - The `GroupRegistry` and `MessageService`
 *
 * Everything is behind `Arc`, so cloning the state per request is cheap.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::chat::MessageService;
use crate::backend::groups::GroupRegistry;
use crate::backend::middleware::AdminIdentity;
use crate::backend::realtime::RoomBroadcaster;
use crate::backend::store::Stores;
use crate::shared::ServerConfig;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub stores: Stores,
    pub broadcaster: Arc<RoomBroadcaster>,
    pub groups: Arc<GroupRegistry>,
    pub messages: Arc<MessageService>,
}

impl AppState {
    /// Wire the services over `stores` with a fresh broadcaster
    pub fn new(config: ServerConfig, stores: Stores) -> Self {
        let broadcaster = Arc::new(RoomBroadcaster::new(config.room_capacity));
        let admin = AdminIdentity::new(config.admin_email.clone());

        let groups = Arc::new(GroupRegistry::new(
            stores.groups.clone(),
            stores.messages.clone(),
            stores.users.clone(),
            broadcaster.clone(),
            admin.clone(),
            config.bcrypt_cost,
        ));
        let messages = Arc::new(MessageService::new(
            stores.messages.clone(),
            stores.users.clone(),
            broadcaster.clone(),
            admin,
            config.edit_window_secs,
            config.history_limit,
        ));

        Self {
            config: Arc::new(config),
            stores,
            broadcaster,
            groups,
            messages,
        }
    }
}

impl FromRef<AppState> for Arc<GroupRegistry> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.groups.clone()
    }
}

impl FromRef<AppState> for Arc<MessageService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.messages.clone()
    }
}
