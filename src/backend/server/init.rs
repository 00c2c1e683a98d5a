/**
 * Server Initialization
 *
 * Builds the application state and router.
 *
 * # Initialization Process
 *
 * 1. Load repositories (PostgreSQL if configured, else in-memory)
 * 2. Create the state: broadcaster, group registry, message service
 * 3. Install the broadcaster in the process-wide registry
 * 4. Start the idle-room sweep
 * 5. Create the router
 */

use std::time::Duration;

use axum::Router;

use crate::backend::realtime::registry;
use crate::backend::routes::create_router;
use crate::backend::server::config::load_stores;
use crate::backend::server::state::AppState;
use crate::backend::store::Stores;
use crate::shared::ServerConfig;

/// Idle rooms are swept at this interval
pub const ROOM_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Build the state and router over the given stores
///
/// Does not touch the process-wide registry; used directly by tests.
pub fn build_app(config: ServerConfig, stores: Stores) -> (Router<()>, AppState) {
    let app_state = AppState::new(config, stores);
    let app = create_router(app_state.clone());
    (app, app_state)
}

/// Create the server application
///
/// Installs the broadcaster so `registry::shutdown` can close its rooms, and
/// spawns the sweep that runs until then.
pub async fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!("Initializing SurfChat backend server");

    let stores = load_stores(&config).await;
    let (app, app_state) = build_app(config, stores);

    registry::install(app_state.broadcaster.clone());
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ROOM_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let Some(broadcaster) = registry::current() else {
                break;
            };
            let removed = broadcaster.cleanup_inactive_rooms();
            tracing::debug!("Swept {} idle rooms", removed);
        }
        tracing::debug!("Room sweep stopped");
    });

    tracing::info!("Router configured with periodic room sweep");

    app
}
