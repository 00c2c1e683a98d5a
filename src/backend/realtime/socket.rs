/**
 * Chat Socket
 *
 * GET /api/socket upgrades to a WebSocket carrying JSON text frames of the
 * form `{"event": "...", "data": {...}}`.
 *
 * # Client events
 *
 * - `join {group, userId}` - requires membership; subscribes the socket to
 *   the group's room and answers `joined {group}`
 * - `leave {group}` - unsubscribes
 * - `message {group, userId, username, message}` - requires membership;
 *   stores the message, which the `MessageService` publishes to the room
 *
 * A rejected client event is answered with `error {message}` on this socket
 * only; the connection stays open.
 *
 * # Per-connection tasks
 *
 * Every joined room gets a forwarding task that copies room events into the
 * connection's outbound queue. The connection loop is the only writer to the
 * socket: it drains that queue and writes replies to client events directly,
 * never through the queue. When the room is closed (group deleted) the
 * forwarding task ends. On server shutdown the loop sends a close frame.
 */

use std::collections::HashMap;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::StreamExt;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use super::broadcast::RoomId;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::server::state::AppState;
use crate::shared::event::{JoinPayload, SendPayload};
use crate::shared::{ClientEvent, ServerEvent};

/// A joined room and the task forwarding it; dropping it stops the task
struct Subscription {
    room_id: RoomId,
    task: JoinHandle<()>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Rooms joined by one connection, keyed by the room's current name
type Subscriptions = HashMap<String, Subscription>;

/// Handles WebSocket upgrade requests to `/api/socket`
pub async fn socket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<ServerEvent>(state.config.room_capacity);
    let mut subscriptions = Subscriptions::new();
    let mut closing = state.broadcaster.closing();

    tracing::debug!("[Socket] Connection opened");

    if *closing.borrow_and_update() {
        let _ = socket.send(Message::Close(None)).await;
        return;
    }

    loop {
        tokio::select! {
            changed = closing.changed() => {
                if changed.is_err() || *closing.borrow_and_update() {
                    tracing::debug!("[Socket] Server shutting down");
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            }
            Some(event) = outbound_rx.recv() => {
                track_room_changes(&event, &mut subscriptions);
                if send_event(&mut socket, &event).await.is_err() {
                    break; // Client disconnected
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let reply =
                            handle_frame(&state, text.as_str(), &outbound_tx, &mut subscriptions)
                                .await;
                        if let Some(reply) = reply {
                            if send_event(&mut socket, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!("[Socket] Receive error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => {} // Ping/pong and binary frames
                }
            }
        }
    }

    subscriptions.clear();
    tracing::debug!("[Socket] Connection closed");
}

/// Write one event as a text frame; an event that fails to encode is skipped
async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), axum::Error> {
    match event.to_frame() {
        Ok(frame) => socket.send(Message::Text(frame.into())).await,
        Err(e) => {
            tracing::error!("[Socket] Failed to encode {} event: {}", event.name(), e);
            Ok(())
        }
    }
}

/// Keep the subscription map keyed by the room's current name
fn track_room_changes(event: &ServerEvent, subscriptions: &mut Subscriptions) {
    match event {
        ServerEvent::GroupRenamed { from, to } => {
            // Already re-keyed if the client joined `to` first
            if let Some(subscription) = subscriptions.remove(from) {
                subscriptions.insert(to.clone(), subscription);
            }
        }
        ServerEvent::GroupDeleted { group } => {
            subscriptions.remove(group);
        }
        _ => {}
    }
}

/// Apply one client frame; returns the reply for this socket, if any
async fn handle_frame(
    state: &AppState,
    frame: &str,
    outbound: &mpsc::Sender<ServerEvent>,
    subscriptions: &mut Subscriptions,
) -> Option<ServerEvent> {
    let result = match ClientEvent::parse(frame) {
        Ok(ClientEvent::Join(payload)) => join(state, payload, outbound, subscriptions)
            .await
            .map(Some),
        Ok(ClientEvent::Leave(payload)) => {
            if subscriptions.remove(&payload.group).is_some() {
                tracing::debug!("[Socket] Left '{}'", payload.group);
            }
            Ok(None)
        }
        Ok(ClientEvent::Message(payload)) => send_message(state, payload).await.map(|_| None),
        Err(e) => Err(BackendError::from(e)),
    };

    result.unwrap_or_else(|e| {
        tracing::warn!("[Socket] Rejected client event: {}", e);
        Some(ServerEvent::error(e.message()))
    })
}

async fn require_member(state: &AppState, group: &str, user_id: &str) -> BackendResult<()> {
    if state.groups.is_member(group, user_id).await? {
        Ok(())
    } else {
        Err(BackendError::forbidden(format!("Not a member of '{}'", group)))
    }
}

async fn join(
    state: &AppState,
    payload: JoinPayload,
    outbound: &mpsc::Sender<ServerEvent>,
    subscriptions: &mut Subscriptions,
) -> BackendResult<ServerEvent> {
    require_member(state, &payload.group, &payload.user_id).await?;

    let (room_id, receiver) = state.broadcaster.join(&payload.group);
    let known_as = subscriptions
        .iter()
        .find(|(_, subscription)| subscription.room_id == room_id)
        .map(|(name, _)| name.clone());

    match known_as {
        Some(name) if name == payload.group => {}
        Some(name) => {
            // Joined under the new name before the rename reached this socket
            if let Some(subscription) = subscriptions.remove(&name) {
                subscriptions.insert(payload.group.clone(), subscription);
            }
        }
        None => {
            let task = forward_room(payload.group.clone(), receiver, outbound.clone());
            subscriptions.insert(payload.group.clone(), Subscription { room_id, task });
            tracing::info!("[Socket] User {} joined '{}'", payload.user_id, payload.group);
        }
    }

    Ok(ServerEvent::Joined {
        group: payload.group,
    })
}

async fn send_message(state: &AppState, payload: SendPayload) -> BackendResult<()> {
    require_member(state, &payload.group, &payload.user_id).await?;
    state
        .messages
        .create(
            &payload.group,
            &payload.user_id,
            &payload.username,
            &payload.message,
        )
        .await?;
    Ok(())
}

/// Copy a room's events into a connection's outbound queue
fn forward_room(
    room: String,
    receiver: broadcast::Receiver<ServerEvent>,
    outbound: mpsc::Sender<ServerEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stream = BroadcastStream::new(receiver);
        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => {
                    if outbound.send(event).await.is_err() {
                        break;
                    }
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!("[Socket] Subscriber of '{}' lagged, skipped {} events", room, skipped);
                }
            }
        }
        tracing::debug!("[Socket] Stopped forwarding '{}'", room);
    })
}
