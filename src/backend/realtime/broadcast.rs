/**
 * Room Broadcasting
 *
 * One `tokio::sync::broadcast` channel per group name. Sockets subscribe to a
 * room when they join a group; services publish `ServerEvent`s to the room
 * after every successful mutation.
 *
 * # Delivery
 *
 * Best-effort and at-most-once. A receiver that falls more than the room
 * capacity behind loses the oldest events (`Lagged`). Publishing to a room
 * nobody has joined is a no-op.
 *
 * # Lifecycle
 *
 * Rooms are created lazily by `join`. Each room gets a `RoomId` that stays
 * the same across renames. Dropping a room's sender (on `close_room`, or the
 * periodic sweep of rooms without receivers) ends every subscriber's stream.
 * `close_all` also flips the `closing` signal so connections can hang up.
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, watch};

use crate::shared::ServerEvent;

/// Identity of a room, unchanged by renames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomId(u64);

struct Room {
    id: RoomId,
    sender: broadcast::Sender<ServerEvent>,
}

/// Per-group broadcast rooms
pub struct RoomBroadcaster {
    rooms: Mutex<HashMap<String, Room>>,
    next_id: AtomicU64,
    capacity: usize,
    closing: watch::Sender<bool>,
}

impl RoomBroadcaster {
    /// Create a broadcaster whose rooms buffer `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            capacity: capacity.max(1),
            closing: watch::channel(false).0,
        }
    }

    fn rooms(&self) -> MutexGuard<'_, HashMap<String, Room>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to a room, creating it if needed, and return its identity
    pub fn join(&self, room: &str) -> (RoomId, broadcast::Receiver<ServerEvent>) {
        let mut rooms = self.rooms();
        let entry = rooms.entry(room.to_string()).or_insert_with(|| Room {
            id: RoomId(self.next_id.fetch_add(1, Ordering::Relaxed)),
            sender: broadcast::channel(self.capacity).0,
        });
        (entry.id, entry.sender.subscribe())
    }

    /// Subscribe to a room, creating it if needed
    pub fn subscribe(&self, room: &str) -> broadcast::Receiver<ServerEvent> {
        self.join(room).1
    }

    /// Publish an event to a room
    ///
    /// Returns the number of subscribers that received it (0 if the room has
    /// none or doesn't exist).
    pub fn broadcast(&self, room: &str, event: ServerEvent) -> usize {
        let name = event.name();
        let Some(sender) = self.rooms().get(room).map(|r| r.sender.clone()) else {
            tracing::debug!("[Realtime] No room '{}' for {} event", room, name);
            return 0;
        };

        match sender.send(event) {
            Ok(subscriber_count) => {
                tracing::info!(
                    "[Realtime] {} event broadcast to {} subscribers of '{}'",
                    name,
                    subscriber_count,
                    room
                );
                subscriber_count
            }
            Err(_) => {
                tracing::debug!("[Realtime] No subscribers in '{}' for {} event", room, name);
                0
            }
        }
    }

    /// Move a room to a new name, keeping its subscribers and id
    pub fn rename_room(&self, from: &str, to: &str) {
        let mut rooms = self.rooms();
        if let Some(room) = rooms.remove(from) {
            if rooms.insert(to.to_string(), room).is_some() {
                tracing::warn!("[Realtime] Room '{}' replaced by renamed room '{}'", to, from);
            }
        }
    }

    /// Drop a room; its subscribers see the stream end
    pub fn close_room(&self, room: &str) -> bool {
        self.rooms().remove(room).is_some()
    }

    /// Drop every room without subscribers; returns how many were removed
    pub fn cleanup_inactive_rooms(&self) -> usize {
        let mut rooms = self.rooms();
        let before = rooms.len();
        rooms.retain(|_, room| room.sender.receiver_count() > 0);
        before - rooms.len()
    }

    /// Signal shutdown to every connection and drop every room
    pub fn close_all(&self) {
        self.closing.send_replace(true);
        let mut rooms = self.rooms();
        tracing::info!("[Realtime] Closing {} rooms", rooms.len());
        rooms.clear();
    }

    /// Watch for `close_all`; the value turns `true` once and stays there
    pub fn closing(&self) -> watch::Receiver<bool> {
        self.closing.subscribe()
    }

    /// Subscriber count for a room
    pub fn subscriber_count(&self, room: &str) -> usize {
        self.rooms()
            .get(room)
            .map(|room| room.sender.receiver_count())
            .unwrap_or(0)
    }

    /// Number of open rooms
    pub fn room_count(&self) -> usize {
        self.rooms().len()
    }
}
