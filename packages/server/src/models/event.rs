use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{game::GamePhase, role::Role};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPayload {
    pub target: String,
}

/// Frames a client may send over the socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    JoinGame(String),
    NightAction(TargetPayload),
    DayVote(TargetPayload),
    ResetGame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub name: String,
    pub alive: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinConfirmation {
    pub message: String,
    pub current_count: usize,
    pub required_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingRoom {
    pub current_count: usize,
    pub required_count: usize,
    pub players: Vec<RosterEntry>,
}

/// Everything the game core can tell a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    JoinConfirmed(JoinConfirmation),
    PlayersWaiting(WaitingRoom),
    GameStarted { message: String },
    YourRole { role: Role },
    PhaseUpdate { phase: GamePhase },
    Message(String),
    ActionReceived(String),
    ErrorMessage(String),
    YouDied,
    ForceReload,
    SeerDiscoveriesUpdate(BTreeMap<String, Role>),
    PlayersUpdate(Vec<RosterEntry>),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::JoinConfirmed(_) => "joinConfirmed",
            ServerEvent::PlayersWaiting(_) => "playersWaiting",
            ServerEvent::GameStarted { .. } => "gameStarted",
            ServerEvent::YourRole { .. } => "yourRole",
            ServerEvent::PhaseUpdate { .. } => "phaseUpdate",
            ServerEvent::Message(_) => "message",
            ServerEvent::ActionReceived(_) => "actionReceived",
            ServerEvent::ErrorMessage(_) => "errorMessage",
            ServerEvent::YouDied => "youDied",
            ServerEvent::ForceReload => "forceReload",
            ServerEvent::SeerDiscoveriesUpdate(_) => "seerDiscoveriesUpdate",
            ServerEvent::PlayersUpdate(_) => "playersUpdate",
        }
    }
}

/// What actually goes over the wire: the event plus a send timestamp.
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    #[serde(flatten)]
    pub event: &'a ServerEvent,
    pub timestamp: String,
}

impl<'a> Envelope<'a> {
    pub fn new(event: &'a ServerEvent) -> Self {
        Self {
            event,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
