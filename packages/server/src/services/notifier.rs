use axum::extract::ws::Message;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

use crate::models::{
    event::{Envelope, ServerEvent},
    player::ConnectionId,
};

/// Where the game core sends its notifications. Implementations must not block.
pub trait Notifier {
    fn send_to(&self, id: ConnectionId, event: ServerEvent);
    fn broadcast(&self, event: ServerEvent);
}

/// Fan-out over the open WebSocket connections. Each connection owns an
/// unbounded queue drained by its socket writer task.
#[derive(Clone, Default)]
pub struct ConnectionHub {
    senders: Arc<RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<Message>>>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: ConnectionId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut senders) = self.senders.write() {
            senders.insert(id, tx);
        }
        rx
    }

    pub fn unregister(&self, id: ConnectionId) {
        if let Ok(mut senders) = self.senders.write() {
            senders.remove(&id);
        }
    }

    pub fn connection_count(&self) -> usize {
        self.senders.read().map(|s| s.len()).unwrap_or(0)
    }

    fn encode(event: &ServerEvent) -> Option<Message> {
        match serde_json::to_string(&Envelope::new(event)) {
            Ok(text) => Some(Message::Text(text)),
            Err(e) => {
                log::error!("failed to encode {} event: {}", event.name(), e);
                None
            }
        }
    }
}

impl Notifier for ConnectionHub {
    fn send_to(&self, id: ConnectionId, event: ServerEvent) {
        let Some(message) = Self::encode(&event) else {
            return;
        };
        let Ok(senders) = self.senders.read() else {
            return;
        };
        match senders.get(&id) {
            Some(tx) => {
                if tx.send(message).is_err() {
                    log::debug!("connection {} closed, dropped {}", id, event.name());
                }
            }
            None => log::debug!("no connection {}, dropped {}", id, event.name()),
        }
    }

    fn broadcast(&self, event: ServerEvent) {
        let Some(message) = Self::encode(&event) else {
            return;
        };
        let Ok(senders) = self.senders.read() else {
            return;
        };
        for (id, tx) in senders.iter() {
            if tx.send(message.clone()).is_err() {
                log::debug!("connection {} closed, dropped {}", id, event.name());
            }
        }
    }
}
