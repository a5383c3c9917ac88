use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use werewolf_server::{
    app,
    models::{config::RuleConfig, game::GamePhase, game::GameSnapshot},
    state::AppState,
    utils::test_setup::{classic_pool, setup_test_env},
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server() -> (std::net::SocketAddr, AppState) {
    setup_test_env();
    let state = AppState::new(classic_pool(), RuleConfig::default());
    let app = app::create_app(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

async fn connect(addr: std::net::SocketAddr) -> Client {
    let (stream, _) = connect_async(format!("ws://{}/api/game/ws", addr))
        .await
        .expect("websocket handshake");
    stream
}

async fn send(client: &mut Client, value: serde_json::Value) {
    client
        .send(Message::Text(value.to_string()))
        .await
        .unwrap();
}

/// Reads frames until one carries `event`, failing after a few seconds.
async fn wait_for(client: &mut Client, event: &str) -> serde_json::Value {
    let read = async {
        while let Some(Ok(frame)) = client.next().await {
            if let Message::Text(text) = frame {
                let value: serde_json::Value = serde_json::from_str(&text).unwrap();
                if value["event"] == event {
                    return value;
                }
            }
        }
        panic!("connection closed before {}", event);
    };
    tokio::time::timeout(Duration::from_secs(5), read)
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {}", event))
}

#[tokio::test]
async fn test_get_state_route() {
    setup_test_env();
    let app = app::create_app(AppState::new(classic_pool(), RuleConfig::default()));

    let request = Request::builder()
        .method("GET")
        .uri("/api/game/state")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let snapshot: GameSnapshot = serde_json::from_slice(&body).unwrap();
    assert_eq!(snapshot.phase, GamePhase::Waiting);
    assert_eq!(snapshot.required_count, 4);
    assert!(snapshot.players.is_empty());
    assert!(snapshot.winner.is_none());
}

#[tokio::test]
async fn test_reset_route() {
    setup_test_env();
    let app = app::create_app(AppState::new(classic_pool(), RuleConfig::default()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/game/reset")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_websocket_game_start() {
    let (addr, state) = spawn_server().await;

    let mut clients = Vec::new();
    for name in ["A", "B", "C", "D"] {
        let mut client = connect(addr).await;
        send(&mut client, serde_json::json!({"event": "joinGame", "data": name})).await;
        let confirm = wait_for(&mut client, "joinConfirmed").await;
        assert_eq!(confirm["data"]["requiredCount"], 4);
        clients.push(client);
    }

    let mut roles = Vec::new();
    for client in clients.iter_mut() {
        let reveal = wait_for(client, "yourRole").await;
        roles.push(reveal["data"]["role"].as_str().unwrap().to_string());
        let phase = wait_for(client, "phaseUpdate").await;
        assert_eq!(phase["data"]["phase"], "night");
    }
    roles.sort();
    assert_eq!(roles, vec!["bodyguard", "seer", "villager", "werewolf"]);
    assert_eq!(state.snapshot().await.phase, GamePhase::Night);
}

#[tokio::test]
async fn test_websocket_malformed_frame_and_mid_game_join() {
    let (addr, state) = spawn_server().await;

    let mut probe = connect(addr).await;
    probe
        .send(Message::Text("not json".to_string()))
        .await
        .unwrap();
    let error = wait_for(&mut probe, "errorMessage").await;
    assert!(error["data"]
        .as_str()
        .unwrap()
        .starts_with("Malformed message"));

    let mut clients = Vec::new();
    for name in ["A", "B", "C", "D"] {
        let mut client = connect(addr).await;
        send(&mut client, serde_json::json!({"event": "joinGame", "data": name})).await;
        wait_for(&mut client, "joinConfirmed").await;
        clients.push(client);
    }

    send(&mut probe, serde_json::json!({"event": "joinGame", "data": "Late"})).await;
    let rejected = wait_for(&mut probe, "errorMessage").await;
    assert_eq!(rejected["data"], "Cannot join mid-game.");
    assert_eq!(state.snapshot().await.current_count, 4);
}

#[tokio::test]
async fn test_websocket_disconnect_in_waiting_room() {
    let (addr, state) = spawn_server().await;

    let mut leaver = connect(addr).await;
    send(&mut leaver, serde_json::json!({"event": "joinGame", "data": "A"})).await;
    wait_for(&mut leaver, "joinConfirmed").await;

    let mut stayer = connect(addr).await;
    send(&mut stayer, serde_json::json!({"event": "joinGame", "data": "B"})).await;
    wait_for(&mut stayer, "joinConfirmed").await;

    leaver.close(None).await.unwrap();

    let update = async {
        loop {
            let room = wait_for(&mut stayer, "playersWaiting").await;
            if room["data"]["currentCount"] == 1 {
                return room;
            }
        }
    };
    let room = tokio::time::timeout(Duration::from_secs(5), update)
        .await
        .expect("waiting room update");
    assert_eq!(room["data"]["players"][0]["name"], "B");
    assert_eq!(state.snapshot().await.current_count, 1);
}
