use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::{state::AppState, utils::websocket};

pub fn routes(state: AppState) -> Router {
    Router::new()
        // WebSocket接続
        // websocat ws://localhost:3000/api/game/ws
        .route("/ws", get(websocket::handler))
        // curl http://localhost:3000/api/game/state
        .route("/state", get(get_game_state))
        // curl -X POST http://localhost:3000/api/game/reset
        .route("/reset", post(reset_game))
        .with_state(state)
}

pub async fn get_game_state(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.snapshot().await))
}

async fn reset_game(State(state): State<AppState>) -> impl IntoResponse {
    state.reset().await;
    (StatusCode::OK, Json("Game reset successfully"))
}
