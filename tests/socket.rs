//! Chat socket tests
//!
//! Serves the app on an ephemeral port and drives `/api/socket` with a real
//! WebSocket client.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use surfchat::backend::realtime::registry;

use common::{seed_user, serve, serve_with, test_config, ADMIN_EMAIL};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{}/api/socket", addr))
        .await
        .unwrap();
    client
}

async fn emit(client: &mut Client, event: &str, data: Value) {
    let frame = json!({ "event": event, "data": data }).to_string();
    client.send(Message::Text(frame.into())).await.unwrap();
}

/// Next JSON text frame, failing after two seconds
async fn next_event(client: &mut Client) -> Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(2), client.next())
            .await
            .expect("timed out waiting for an event")
            .unwrap()
            .unwrap();
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn assert_silent(client: &mut Client) {
    let result = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    assert!(result.is_err(), "unexpected frame: {:?}", result);
}

/// Read past other events until one named `name` arrives
async fn next_named(client: &mut Client, name: &str) -> Value {
    loop {
        let event = next_event(client).await;
        if event["event"] == name {
            return event;
        }
    }
}

async fn join(client: &mut Client, group: &str, user_id: &str) {
    emit(client, "join", json!({ "group": group, "userId": user_id })).await;
    let ack = next_event(client).await;
    assert_eq!(ack, json!({ "event": "joined", "data": { "group": group } }));
}

#[tokio::test]
async fn test_message_lifecycle_reaches_only_its_group() {
    let (addr, state) = serve().await;
    let kelly = seed_user(&state, "kelly", "kelly@surf.test").await;
    let laird = seed_user(&state, "laird", "laird@surf.test").await;
    state.groups.create("north-shore", "barrels", &kelly.id).await.unwrap();
    state.groups.create("jaws", "bombs", &laird.id).await.unwrap();

    let mut north = connect(addr).await;
    let mut maui = connect(addr).await;
    join(&mut north, "north-shore", &kelly.id).await;
    join(&mut maui, "jaws", &laird.id).await;

    emit(
        &mut north,
        "message",
        json!({
            "group": "north-shore",
            "userId": kelly.id,
            "username": "kelly",
            "message": "head high and glassy",
        }),
    )
    .await;
    let posted = next_event(&mut north).await;
    assert_eq!(posted["event"], "message");
    assert_eq!(posted["data"]["message"], "head high and glassy");
    let id: uuid::Uuid = posted["data"]["_id"].as_str().unwrap().parse().unwrap();

    state.messages.edit(id, &kelly.id, "overhead now").await.unwrap();
    let edited = next_event(&mut north).await;
    assert_eq!(
        edited,
        json!({ "event": "messageEdited", "data": { "_id": id, "message": "overhead now" } })
    );

    state.messages.react(id, &laird.id, "🤙").await.unwrap();
    let reacted = next_event(&mut north).await;
    assert_eq!(reacted["event"], "messageReacted");
    assert_eq!(reacted["data"]["reactions"][0]["emoji"], "🤙");

    state.messages.delete(id, ADMIN_EMAIL).await.unwrap();
    let deleted = next_event(&mut north).await;
    assert_eq!(
        deleted,
        json!({ "event": "messageDeleted", "data": { "_id": id } })
    );

    assert_silent(&mut maui).await;
}

#[tokio::test]
async fn test_non_member_is_rejected() {
    let (addr, state) = serve().await;
    let kelly = seed_user(&state, "kelly", "kelly@surf.test").await;
    state.groups.create("north-shore", "barrels", &kelly.id).await.unwrap();

    let mut client = connect(addr).await;
    emit(&mut client, "join", json!({ "group": "north-shore", "userId": "stranger" })).await;
    let rejected = next_event(&mut client).await;
    assert_eq!(rejected["event"], "error");

    emit(
        &mut client,
        "message",
        json!({
            "group": "north-shore",
            "userId": "stranger",
            "username": "stranger",
            "message": "let me in",
        }),
    )
    .await;
    assert_eq!(next_event(&mut client).await["event"], "error");

    emit(&mut client, "shout", json!({})).await;
    assert_eq!(next_event(&mut client).await["event"], "error");

    // The connection survives rejected events
    join(&mut client, "north-shore", &kelly.id).await;
}

#[tokio::test]
async fn test_leave_stops_delivery() {
    let (addr, state) = serve().await;
    let kelly = seed_user(&state, "kelly", "kelly@surf.test").await;
    state.groups.create("north-shore", "barrels", &kelly.id).await.unwrap();

    let mut client = connect(addr).await;
    join(&mut client, "north-shore", &kelly.id).await;
    emit(&mut client, "leave", json!({ "group": "north-shore" })).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    state
        .messages
        .create("north-shore", &kelly.id, "kelly", "anyone?")
        .await
        .unwrap();
    assert_silent(&mut client).await;
}

#[tokio::test]
async fn test_rename_and_delete_follow_the_room() {
    let (addr, state) = serve().await;
    let admin = seed_user(&state, "admin", ADMIN_EMAIL).await;
    let kelly = seed_user(&state, "kelly", "kelly@surf.test").await;
    let group = state.groups.create("north-shore", "barrels", &kelly.id).await.unwrap();

    let mut client = connect(addr).await;
    join(&mut client, "north-shore", &kelly.id).await;

    state.groups.rename(group.id, "sunset", &admin.id).await.unwrap();
    let renamed = next_event(&mut client).await;
    assert_eq!(
        renamed,
        json!({ "event": "groupRenamed", "data": { "from": "north-shore", "to": "sunset" } })
    );

    state
        .messages
        .create("sunset", &kelly.id, "kelly", "same crew, new name")
        .await
        .unwrap();
    assert_eq!(next_event(&mut client).await["data"]["group"], "sunset");

    state.groups.delete(group.id, &admin.id).await.unwrap();
    let deleted = next_event(&mut client).await;
    assert_eq!(
        deleted,
        json!({ "event": "groupDeleted", "data": { "group": "sunset" } })
    );
    assert_eq!(state.broadcaster.subscriber_count("sunset"), 0);
}

#[tokio::test]
async fn test_pipelined_frames_with_tiny_rooms_keep_flowing() {
    let mut config = test_config();
    config.room_capacity = 1;
    let (addr, state) = serve_with(config).await;
    let kelly = seed_user(&state, "kelly", "kelly@surf.test").await;
    state.groups.create("north-shore", "barrels", &kelly.id).await.unwrap();

    let mut client = connect(addr).await;
    join(&mut client, "north-shore", &kelly.id).await;

    // Room events and error replies pile up while nothing is read
    for i in 0..20 {
        emit(
            &mut client,
            "message",
            json!({
                "group": "north-shore",
                "userId": kelly.id,
                "username": "kelly",
                "message": format!("set {}", i),
            }),
        )
        .await;
        client.send(Message::Text("not json".into())).await.unwrap();
    }
    emit(&mut client, "leave", json!({ "group": "north-shore" })).await;
    emit(&mut client, "join", json!({ "group": "north-shore", "userId": kelly.id })).await;

    let joined = tokio::time::timeout(Duration::from_secs(5), next_named(&mut client, "joined"))
        .await
        .expect("socket stopped answering");
    assert_eq!(joined["data"]["group"], "north-shore");
}

#[tokio::test]
async fn test_shutdown_hangs_up_open_sockets() {
    let (addr, state) = serve().await;
    let kelly = seed_user(&state, "kelly", "kelly@surf.test").await;
    state.groups.create("north-shore", "barrels", &kelly.id).await.unwrap();

    let mut client = connect(addr).await;
    join(&mut client, "north-shore", &kelly.id).await;

    registry::install(state.broadcaster.clone());
    registry::shutdown();

    let closed = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match client.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "socket stayed open after shutdown");
    assert_eq!(state.broadcaster.room_count(), 0);
}

#[tokio::test]
async fn test_join_under_new_name_before_rename_arrives() {
    let (addr, state) = serve().await;
    let admin = seed_user(&state, "admin", ADMIN_EMAIL).await;
    let kelly = seed_user(&state, "kelly", "kelly@surf.test").await;
    let group = state.groups.create("north-shore", "barrels", &kelly.id).await.unwrap();

    let mut client = connect(addr).await;
    join(&mut client, "north-shore", &kelly.id).await;

    state.groups.rename(group.id, "sunset", &admin.id).await.unwrap();
    emit(&mut client, "join", json!({ "group": "sunset", "userId": kelly.id })).await;
    let joined = next_named(&mut client, "joined").await;
    assert_eq!(joined["data"]["group"], "sunset");

    state
        .messages
        .create("sunset", &kelly.id, "kelly", "one copy please")
        .await
        .unwrap();
    let message = next_named(&mut client, "message").await;
    assert_eq!(message["data"]["message"], "one copy please");

    // Only one forwarding task: no second copy, and the rename notice (if
    // not yet read) is the only other frame allowed
    loop {
        match tokio::time::timeout(Duration::from_millis(200), client.next()).await {
            Err(_) => break,
            Ok(Some(Ok(Message::Text(text)))) => {
                let event: Value = serde_json::from_str(text.as_str()).unwrap();
                assert_eq!(event["event"], "groupRenamed", "unexpected frame: {}", event);
            }
            Ok(other) => panic!("unexpected frame: {:?}", other),
        }
    }
    assert_eq!(state.broadcaster.subscriber_count("sunset"), 1);
}
