use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::{config::RolePool, config::RuleConfig, event::ClientMessage, game::GameSnapshot};
use crate::models::player::ConnectionId;
use crate::services::{game_service::GameEngine, notifier::ConnectionHub};

/// Shared handle given to every route and socket task.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<GameEngine>>,
    pub hub: ConnectionHub,
}

impl AppState {
    pub fn new(pool: RolePool, rules: RuleConfig) -> Self {
        Self::from_engine(GameEngine::new(pool, rules))
    }

    pub fn from_engine(engine: GameEngine) -> Self {
        AppState {
            engine: Arc::new(Mutex::new(engine)),
            hub: ConnectionHub::new(),
        }
    }

    /// Runs one inbound event to completion while holding the game lock.
    pub async fn dispatch(&self, actor: ConnectionId, message: ClientMessage) {
        let mut engine = self.engine.lock().await;
        engine.handle(actor, message, &self.hub);
    }

    pub async fn disconnect(&self, actor: ConnectionId) {
        self.hub.unregister(actor);
        let mut engine = self.engine.lock().await;
        engine.disconnect(actor, &self.hub);
    }

    pub async fn reset(&self) {
        let mut engine = self.engine.lock().await;
        engine.reset(&self.hub);
    }

    pub async fn snapshot(&self) -> GameSnapshot {
        self.engine.lock().await.snapshot()
    }
}
