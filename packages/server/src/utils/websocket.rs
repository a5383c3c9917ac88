use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tracing::{info, warn};

use crate::models::{
    event::{ClientMessage, ServerEvent},
    player::ConnectionId,
};
use crate::services::notifier::Notifier;
use crate::state::AppState;

pub async fn handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// One client session: frames in are dispatched to the game, queued
/// notifications are written out by a separate task.
pub async fn handle_socket(ws: WebSocket, state: AppState) {
    let id = ConnectionId::new();
    info!("New WebSocket connection established: {}", id);

    let mut outbox = state.hub.register(id);
    let (mut sender, mut receiver) = ws.split();

    let send_task = tokio::spawn(async move {
        while let Some(msg) = outbox.recv().await {
            if let Err(e) = sender.send(msg).await {
                warn!("Error sending message to {}: {}", id, e);
                break;
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => state.dispatch(id, message).await,
                Err(e) => {
                    // 不正なメッセージフォーマットは送信元にだけ返す
                    info!("Malformed message from {}: {}", id, e);
                    state.hub.send_to(
                        id,
                        ServerEvent::ErrorMessage(format!("Malformed message: {}", e)),
                    );
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!("WebSocket connection closed: {}", id);
    state.disconnect(id).await;
    let _ = send_task.await;
}
