use std::sync::{Mutex, Once};

use crate::models::{
    config::RolePool, event::ServerEvent, player::ConnectionId, role::Role,
};
use crate::services::notifier::Notifier;

static INIT: Once = Once::new();

pub fn setup_test_env() {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// werewolf, bodyguard, seer, villager
pub fn classic_pool() -> RolePool {
    RolePool::new(vec![
        Role::Werewolf,
        Role::Bodyguard,
        Role::Seer,
        Role::Villager,
    ])
    .expect("non-empty pool")
}

/// Keeps every notification so tests can assert on who was told what.
#[derive(Default)]
pub struct RecordingNotifier {
    // None = broadcast
    log: Mutex<Vec<(Option<ConnectionId>, ServerEvent)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<(Option<ConnectionId>, ServerEvent)> {
        self.log.lock().unwrap().clone()
    }

    /// Events sent privately to `id`, in order.
    pub fn sent_to(&self, id: ConnectionId) -> Vec<ServerEvent> {
        self.all()
            .into_iter()
            .filter(|(to, _)| *to == Some(id))
            .map(|(_, event)| event)
            .collect()
    }

    pub fn broadcasts(&self) -> Vec<ServerEvent> {
        self.all()
            .into_iter()
            .filter(|(to, _)| to.is_none())
            .map(|(_, event)| event)
            .collect()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn send_to(&self, id: ConnectionId, event: ServerEvent) {
        self.log.lock().unwrap().push((Some(id), event));
    }

    fn broadcast(&self, event: ServerEvent) {
        self.log.lock().unwrap().push((None, event));
    }
}
