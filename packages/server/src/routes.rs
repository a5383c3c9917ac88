use crate::state::AppState;
use axum::Router;

mod game;

pub fn create_routes(state: AppState) -> Router {
    Router::new().nest("/api/game", game::routes(state))
}
