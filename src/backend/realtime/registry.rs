//! Process-wide broadcaster registry
//!
//! The server creates its `RoomBroadcaster` at startup and installs it here.
//! Background tasks look it up with [`current`]; [`shutdown`] removes it and
//! closes every room so socket tasks wind down.

use std::sync::{Arc, PoisonError, RwLock};

use super::broadcast::RoomBroadcaster;

static BROADCASTER: RwLock<Option<Arc<RoomBroadcaster>>> = RwLock::new(None);

/// Install the broadcaster, replacing any previous one
pub fn install(broadcaster: Arc<RoomBroadcaster>) {
    let mut slot = BROADCASTER.write().unwrap_or_else(PoisonError::into_inner);
    if slot.replace(broadcaster).is_some() {
        tracing::warn!("[Realtime] Replaced an already installed broadcaster");
    }
}

/// The installed broadcaster, if the server is running
pub fn current() -> Option<Arc<RoomBroadcaster>> {
    BROADCASTER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Uninstall the broadcaster and close all of its rooms
pub fn shutdown() {
    let taken = BROADCASTER
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(broadcaster) = taken {
        broadcaster.close_all();
    }
}
