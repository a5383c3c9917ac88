use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::models::{
    config::{DayQuorum, RolePool, RuleConfig},
    event::{ClientMessage, JoinConfirmation, ServerEvent},
    game::{GamePhase, GameSnapshot, GameState},
    player::{ConnectionId, ConnectionStatus, Player},
};
use crate::services::{
    day_resolver, night_resolver, notifier::Notifier, role_assigner, win_evaluator,
};

pub const NIGHT_MESSAGE: &str =
    "Night has begun. Werewolves, Bodyguard and Seer, choose your targets.";
pub const DAY_MESSAGE: &str = "Day has begun. Discuss and vote who to eliminate.";
pub const START_MESSAGE: &str = "All players have joined! Game started! Night falls...";
pub const RESET_MESSAGE: &str = "Game has been reset. Reloading...";

/// Rejections that are reported back to the requester. None of them change
/// the game state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("Cannot join mid-game.")]
    JoinRejected,
    #[error("You have already joined as \"{0}\".")]
    AlreadyJoined(String),
    #[error("You have already voted this night!")]
    AlreadyVotedTonight,
    #[error("You have already voted this day!")]
    AlreadyVotedToday,
    #[error("There is no player named \"{0}\".")]
    UnknownTarget(String),
    #[error("You protected {0} last night. Choose someone else.")]
    RepeatedProtection(String),
}

fn phase_message(phase: GamePhase) -> Option<&'static str> {
    match phase {
        GamePhase::Night => Some(NIGHT_MESSAGE),
        GamePhase::Day => Some(DAY_MESSAGE),
        GamePhase::Waiting | GamePhase::End => None,
    }
}

/// Drives the waiting -> night -> day -> ... -> end cycle for the single game
/// this process hosts. Every method runs to completion, notifications included.
pub struct GameEngine {
    state: GameState,
    rules: RuleConfig,
    rng: StdRng,
}

impl GameEngine {
    pub fn new(pool: RolePool, rules: RuleConfig) -> Self {
        Self::with_rng(pool, rules, StdRng::from_entropy())
    }

    /// Same as [`GameEngine::new`] with a caller-provided generator, so role
    /// dealing and werewolf tie-breaks can be replayed.
    pub fn with_rng(pool: RolePool, rules: RuleConfig, rng: StdRng) -> Self {
        GameEngine {
            state: GameState::new(pool),
            rules,
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.state.phase,
            current_count: self.state.players.len(),
            required_count: self.state.required_players(),
            players: self.state.roster(self.rules.reveal_roles_in_roster),
            winner: self.state.winner,
        }
    }

    pub fn handle(&mut self, actor: ConnectionId, message: ClientMessage, notifier: &dyn Notifier) {
        match message {
            ClientMessage::JoinGame(name) => self.join(actor, &name, notifier),
            ClientMessage::NightAction(payload) => {
                self.night_action(actor, &payload.target, notifier)
            }
            ClientMessage::DayVote(payload) => self.day_vote(actor, &payload.target, notifier),
            ClientMessage::ResetGame => self.reset(notifier),
        }
    }

    pub fn join(&mut self, actor: ConnectionId, name: &str, notifier: &dyn Notifier) {
        if self.state.phase == GamePhase::End {
            self.reset(notifier);
        }

        if let Some(current) = self.state.player(actor).filter(|p| p.name != name) {
            let err = GameError::AlreadyJoined(current.name.clone());
            notifier.send_to(actor, ServerEvent::ErrorMessage(err.to_string()));
            return;
        }

        let existing = self.state.player_by_name(name).map(|p| p.id);
        let rejoined = existing.is_some();
        match existing {
            Some(old) => {
                self.state.rebind_identity(old, actor);
                if let Some(player) = self.state.player_mut(actor) {
                    player.connection = ConnectionStatus::Connected;
                }
                log::info!("{} rejoined during {:?}", name, self.state.phase);
                notifier.send_to(
                    actor,
                    ServerEvent::JoinConfirmed(JoinConfirmation {
                        message: format!("Welcome back, {}.", name),
                        current_count: self.state.players.len(),
                        required_count: self.state.required_players(),
                    }),
                );
            }
            None => {
                if self.state.phase != GamePhase::Waiting {
                    log::debug!("rejected join from {} during {:?}", name, self.state.phase);
                    notifier.send_to(
                        actor,
                        ServerEvent::ErrorMessage(GameError::JoinRejected.to_string()),
                    );
                    return;
                }
                self.state
                    .players
                    .push(Player::new(actor, name.to_string()));
                log::info!(
                    "{} joined ({}/{})",
                    name,
                    self.state.players.len(),
                    self.state.required_players()
                );
                notifier.send_to(
                    actor,
                    ServerEvent::JoinConfirmed(JoinConfirmation {
                        message: format!(
                            "You have joined the game as \"{}\". Waiting for others...",
                            name
                        ),
                        current_count: self.state.players.len(),
                        required_count: self.state.required_players(),
                    }),
                );
            }
        }

        notifier.broadcast(ServerEvent::PlayersWaiting(self.state.waiting_room()));

        if self.state.phase == GamePhase::Waiting && self.state.is_full() {
            self.start_game(notifier);
        } else if rejoined
            && matches!(self.state.phase, GamePhase::Night | GamePhase::Day)
        {
            self.resend_phase(actor, notifier);
        }
    }

    pub fn disconnect(&mut self, actor: ConnectionId, notifier: &dyn Notifier) {
        let Some(player) = self.state.player_mut(actor) else {
            return;
        };
        player.connection = ConnectionStatus::Disconnected;
        log::info!("{} disconnected", player.name);

        match self.state.phase {
            GamePhase::Waiting => {
                self.state.players.retain(|p| p.id != actor);
                notifier.broadcast(ServerEvent::PlayersWaiting(self.state.waiting_room()));
            }
            GamePhase::Day if self.rules.day_quorum == DayQuorum::ConnectedAlive => {
                if day_resolver::is_complete(&self.state, self.rules.day_quorum) {
                    self.finish_day(notifier);
                }
            }
            _ => {}
        }
    }

    pub fn night_action(&mut self, actor: ConnectionId, target: &str, notifier: &dyn Notifier) {
        match night_resolver::submit(&mut self.state, &self.rules, actor, target) {
            Ok(Some(ack)) => notifier.send_to(actor, ServerEvent::ActionReceived(ack.to_string())),
            Ok(None) => {
                log::debug!("ignored night action from {}", actor);
                return;
            }
            Err(e) => {
                notifier.send_to(actor, ServerEvent::ErrorMessage(e.to_string()));
                return;
            }
        }

        if night_resolver::is_complete(&self.state) {
            self.finish_night(notifier);
        }
    }

    pub fn day_vote(&mut self, actor: ConnectionId, target: &str, notifier: &dyn Notifier) {
        match day_resolver::submit(&mut self.state, actor, target) {
            Ok(Some(ack)) => notifier.send_to(actor, ServerEvent::ActionReceived(ack.to_string())),
            Ok(None) => {
                log::debug!("ignored day vote from {}", actor);
                return;
            }
            Err(e) => {
                notifier.send_to(actor, ServerEvent::ErrorMessage(e.to_string()));
                return;
            }
        }

        if day_resolver::is_complete(&self.state, self.rules.day_quorum) {
            self.finish_day(notifier);
        }
    }

    /// Empties the room and tells every client to go through joining again.
    pub fn reset(&mut self, notifier: &dyn Notifier) {
        self.state.reset();
        log::info!("game reset");
        notifier.broadcast(ServerEvent::PlayersWaiting(self.state.waiting_room()));
        notifier.broadcast(ServerEvent::Message(RESET_MESSAGE.to_string()));
        notifier.broadcast(ServerEvent::ForceReload);
    }

    fn start_game(&mut self, notifier: &dyn Notifier) {
        self.state.phase = GamePhase::Night;
        let dealt = role_assigner::assign_roles(&mut self.state, &mut self.rng);

        notifier.broadcast(ServerEvent::GameStarted {
            message: START_MESSAGE.to_string(),
        });
        for (id, role) in dealt {
            notifier.send_to(id, ServerEvent::YourRole { role });
        }
        notifier.broadcast(ServerEvent::PlayersUpdate(
            self.state.roster(self.rules.reveal_roles_in_roster),
        ));
        self.announce_phase(notifier);
    }

    fn finish_night(&mut self, notifier: &dyn Notifier) {
        let outcome = night_resolver::resolve(&mut self.state, &self.rules, &mut self.rng, notifier);
        log::info!(
            "night resolved: candidate={:?} eliminated={:?} protected={}",
            outcome.candidate,
            outcome.eliminated,
            outcome.protected
        );

        if !self.declare_winner(notifier) {
            self.state.phase = GamePhase::Day;
            self.state.clear_day();
            self.announce_phase(notifier);
        }
    }

    fn finish_day(&mut self, notifier: &dyn Notifier) {
        let outcome = day_resolver::resolve(&mut self.state, &self.rules, &mut self.rng, notifier);
        log::info!(
            "day resolved: tally={:?} eliminated={:?}",
            outcome.tally,
            outcome.eliminated
        );

        if !self.declare_winner(notifier) {
            self.state.phase = GamePhase::Night;
            self.state.clear_night();
            self.announce_phase(notifier);
        }
    }

    /// Ends the game if a faction has won. Returns whether it did.
    fn declare_winner(&mut self, notifier: &dyn Notifier) -> bool {
        let Some(winner) = win_evaluator::evaluate(&self.state) else {
            return false;
        };
        self.state.phase = GamePhase::End;
        self.state.winner = Some(winner);
        log::info!("game over: {:?} win", winner);
        notifier.broadcast(ServerEvent::Message(
            win_evaluator::announcement(winner).to_string(),
        ));
        notifier.broadcast(ServerEvent::PhaseUpdate {
            phase: GamePhase::End,
        });
        true
    }

    fn announce_phase(&self, notifier: &dyn Notifier) {
        notifier.broadcast(ServerEvent::PhaseUpdate {
            phase: self.state.phase,
        });
        if let Some(message) = phase_message(self.state.phase) {
            notifier.broadcast(ServerEvent::Message(message.to_string()));
        }
    }

    /// Brings a reconnected player back up to date without touching any
    /// action slot.
    fn resend_phase(&self, actor: ConnectionId, notifier: &dyn Notifier) {
        notifier.send_to(
            actor,
            ServerEvent::PhaseUpdate {
                phase: self.state.phase,
            },
        );
        notifier.send_to(
            actor,
            ServerEvent::PlayersUpdate(self.state.roster(self.rules.reveal_roles_in_roster)),
        );
        if let Some(role) = self.state.player(actor).and_then(|p| p.role.clone()) {
            notifier.send_to(actor, ServerEvent::YourRole { role });
        }
        if let Some(ledger) = self.state.discoveries.get(&actor) {
            notifier.send_to(actor, ServerEvent::SeerDiscoveriesUpdate(ledger.clone()));
        }
        if let Some(message) = phase_message(self.state.phase) {
            notifier.send_to(actor, ServerEvent::Message(message.to_string()));
        }
    }
}
