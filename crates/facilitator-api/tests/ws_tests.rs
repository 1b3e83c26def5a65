//! Wire tests for the `/ws` real-time channel.
//!
//! Each test serves the router on an ephemeral port and talks to it with a
//! real `WebSocket` client, so frames, close handshakes and hub bookkeeping
//! are exercised end to end.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use facilitator_api::{AppState, build_router};
use facilitator_core::{AuthConfig, BroadcastHub, Services, Stores};
use facilitator_types::{CreateEvent, EventType};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

fn make_test_state() -> Arc<AppState> {
    let auth = AuthConfig {
        jwt_secret: String::from("ws-test-secret-long-enough"),
        token_ttl_secs: 3600,
        bcrypt_cost: 4,
    };
    let services = Services::new(Stores::in_memory(), Arc::new(BroadcastHub::new()), &auth);
    Arc::new(AppState::new(services))
}

async fn spawn_server(state: Arc<AppState>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_router(state, &[]);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Connect and wait until the server side has attached to the hub.
async fn connect(addr: SocketAddr, hub: &BroadcastHub) -> Client {
    let (ws, _response) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    wait_for_connections(hub, 1).await;
    ws
}

async fn wait_for_connections(hub: &BroadcastHub, expected: usize) {
    timeout(WAIT, async {
        while hub.connection_count().await != expected {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

/// Next text frame, parsed as JSON.
async fn next_json(ws: &mut Client) -> Value {
    let frame = timeout(WAIT, ws.next()).await.unwrap().unwrap().unwrap();
    match frame {
        WsMessage::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn created_event_arrives_as_channel_and_payload() {
    let state = make_test_state();
    let addr = spawn_server(Arc::clone(&state)).await;
    let mut ws = connect(addr, &state.services.hub).await;

    let event = state
        .services
        .events
        .create(CreateEvent {
            event_type: EventType::Incident,
            title: String::from("Main Server Outage"),
            description: String::from("Primary database server is unresponsive"),
            triggered_at: None,
            status: None,
        })
        .await
        .unwrap();

    let frame = next_json(&mut ws).await;
    assert_eq!(frame["channel"], "new-event");
    assert_eq!(frame["payload"], serde_json::to_value(&event).unwrap());
    assert_eq!(frame["payload"]["type"], "incident");
    assert_eq!(frame.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn every_client_receives_each_notification_in_order() {
    let state = make_test_state();
    let hub = &state.services.hub;
    let addr = spawn_server(Arc::clone(&state)).await;
    let mut first = connect(addr, hub).await;
    let (mut second, _response) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    wait_for_connections(hub, 2).await;

    let started = state.services.sessions.start().await.unwrap();
    state.services.sessions.stop().await.unwrap();

    for ws in [&mut first, &mut second] {
        let frame = next_json(ws).await;
        assert_eq!(frame["channel"], "session-update");
        assert_eq!(frame["payload"]["id"], started.id.to_string());
        assert_eq!(frame["payload"]["status"], "active");

        let frame = next_json(ws).await;
        assert_eq!(frame["channel"], "session-update");
        assert_eq!(frame["payload"]["status"], "stopped");
    }
}

#[tokio::test]
async fn client_close_detaches_from_the_hub() {
    let state = make_test_state();
    let hub = &state.services.hub;
    let addr = spawn_server(Arc::clone(&state)).await;
    let mut ws = connect(addr, hub).await;

    ws.close(None).await.unwrap();
    wait_for_connections(hub, 0).await;
    assert!(!hub.is_closed().await);
}

#[tokio::test]
async fn closing_the_hub_closes_open_sockets() {
    let state = make_test_state();
    let hub = &state.services.hub;
    let addr = spawn_server(Arc::clone(&state)).await;
    let mut ws = connect(addr, hub).await;

    hub.close().await;

    let frame = timeout(WAIT, ws.next()).await.unwrap();
    assert!(
        matches!(frame, Some(Ok(WsMessage::Close(_))) | None),
        "expected a close frame, got {frame:?}"
    );
    wait_for_connections(hub, 0).await;
}

#[tokio::test]
async fn connecting_after_shutdown_is_closed_immediately() {
    let state = make_test_state();
    let hub = &state.services.hub;
    hub.close().await;
    let addr = spawn_server(Arc::clone(&state)).await;

    let (mut ws, _response) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    let frame = timeout(WAIT, ws.next()).await.unwrap();
    assert!(
        matches!(frame, Some(Ok(WsMessage::Close(_))) | None),
        "expected a close frame, got {frame:?}"
    );
    assert_eq!(hub.connection_count().await, 0);
}
