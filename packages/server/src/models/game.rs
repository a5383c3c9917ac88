use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::{
    config::RolePool,
    event::{RosterEntry, WaitingRoom},
    player::{ConnectionId, Player},
    role::Role,
};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Waiting, // 参加者待ち
    Night,   // 夜フェーズ
    Day,     // 昼フェーズ（投票）
    End,     // ゲーム終了
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Villagers,
    Werewolves,
}

/// Public view of the game served over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub current_count: usize,
    pub required_count: usize,
    pub players: Vec<RosterEntry>,
    pub winner: Option<Winner>,
}

/// Submissions collected during one night.
#[derive(Debug, Clone, Default)]
pub struct NightActions {
    /// target name -> number of werewolf votes
    pub werewolf_votes: BTreeMap<String, usize>,
    pub werewolf_voters: HashSet<ConnectionId>,
    pub protection: Option<String>,
    pub seer_target: Option<String>,
}

impl NightActions {
    pub fn total_werewolf_votes(&self) -> usize {
        self.werewolf_votes.values().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayVote {
    pub voter: String,
    pub target: String,
}

#[derive(Debug, Clone, Default)]
pub struct DayVotes {
    pub votes: Vec<DayVote>,
    pub voters: HashSet<ConnectionId>,
}

/// The whole mutable record of the one running game.
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: GamePhase,
    pub players: Vec<Player>,
    pub role_pool: RolePool,
    pub night: NightActions,
    pub day: DayVotes,
    /// seer -> (discovered name -> role)
    pub discoveries: HashMap<ConnectionId, BTreeMap<String, Role>>,
    /// Name the bodyguard protected on the previous night.
    pub last_protection: Option<String>,
    pub winner: Option<Winner>,
}

impl GameState {
    pub fn new(role_pool: RolePool) -> Self {
        GameState {
            phase: GamePhase::Waiting,
            players: Vec::new(),
            role_pool,
            night: NightActions::default(),
            day: DayVotes::default(),
            discoveries: HashMap::new(),
            last_protection: None,
            winner: None,
        }
    }

    /// Back to an empty waiting room. The role pool is kept.
    pub fn reset(&mut self) {
        self.phase = GamePhase::Waiting;
        self.players.clear();
        self.night = NightActions::default();
        self.day = DayVotes::default();
        self.discoveries.clear();
        self.last_protection = None;
        self.winner = None;
    }

    pub fn required_players(&self) -> usize {
        self.role_pool.required_players()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() == self.required_players()
    }

    pub fn player(&self, id: ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: ConnectionId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn player_by_name_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.name == name)
    }

    /// A living holder of `role`, if any.
    pub fn living_with_role(&self, role: &Role) -> Option<&Player> {
        self.players.iter().find(|p| p.alive && p.has_role(role))
    }

    pub fn living_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    pub fn living_connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.can_act()).count()
    }

    pub fn living_werewolves(&self) -> usize {
        self.players
            .iter()
            .filter(|p| p.alive && p.is_werewolf())
            .count()
    }

    pub fn living_non_werewolves(&self) -> usize {
        self.players
            .iter()
            .filter(|p| p.alive && !p.is_werewolf())
            .count()
    }

    /// Moves everything keyed by `old` over to `new`, so a reconnecting player
    /// keeps whatever they already submitted this phase.
    pub fn rebind_identity(&mut self, old: ConnectionId, new: ConnectionId) {
        if old == new {
            return;
        }
        if let Some(player) = self.player_mut(old) {
            player.id = new;
        }
        if self.night.werewolf_voters.remove(&old) {
            self.night.werewolf_voters.insert(new);
        }
        if self.day.voters.remove(&old) {
            self.day.voters.insert(new);
        }
        if let Some(ledger) = self.discoveries.remove(&old) {
            self.discoveries.insert(new, ledger);
        }
    }

    pub fn clear_night(&mut self) {
        self.night = NightActions::default();
    }

    pub fn clear_day(&mut self) {
        self.day = DayVotes::default();
    }

    /// Names and alive flags, plus roles when `reveal_roles` is set.
    pub fn roster(&self, reveal_roles: bool) -> Vec<RosterEntry> {
        self.players
            .iter()
            .map(|p| RosterEntry {
                name: p.name.clone(),
                alive: p.alive,
                role: if reveal_roles { p.role.clone() } else { None },
            })
            .collect()
    }

    pub fn waiting_room(&self) -> WaitingRoom {
        WaitingRoom {
            current_count: self.players.len(),
            required_count: self.required_players(),
            players: self.roster(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_setup::classic_pool;

    fn state_with(names: &[&str]) -> GameState {
        let mut state = GameState::new(classic_pool());
        for name in names {
            state
                .players
                .push(Player::new(ConnectionId::new(), name.to_string()));
        }
        state
    }

    #[test]
    fn test_new_state_is_waiting() {
        let state = GameState::new(classic_pool());
        assert_eq!(state.phase, GamePhase::Waiting);
        assert!(state.players.is_empty());
        assert_eq!(state.required_players(), 4);
    }

    #[test]
    fn test_reset_clears_everything_but_pool() {
        let mut state = state_with(&["A", "B"]);
        let seer = state.players[0].id;
        state.phase = GamePhase::End;
        state.night.werewolf_votes.insert("B".into(), 1);
        state.night.protection = Some("A".into());
        state.day.votes.push(DayVote {
            voter: "A".into(),
            target: "B".into(),
        });
        state
            .discoveries
            .insert(seer, BTreeMap::from([("B".to_string(), Role::Villager)]));
        state.winner = Some(Winner::Villagers);

        state.reset();

        assert_eq!(state.phase, GamePhase::Waiting);
        assert!(state.players.is_empty());
        assert!(state.night.werewolf_votes.is_empty());
        assert!(state.night.protection.is_none());
        assert!(state.day.votes.is_empty());
        assert!(state.discoveries.is_empty());
        assert!(state.winner.is_none());
        assert_eq!(state.role_pool, classic_pool());
    }

    #[test]
    fn test_rebind_identity_moves_voter_marks() {
        let mut state = state_with(&["A", "B"]);
        let old = state.players[0].id;
        let new = ConnectionId::new();
        state.night.werewolf_voters.insert(old);
        state.day.voters.insert(old);
        state.discoveries.insert(old, BTreeMap::new());

        state.rebind_identity(old, new);

        assert_eq!(state.players[0].id, new);
        assert!(state.night.werewolf_voters.contains(&new));
        assert!(!state.night.werewolf_voters.contains(&old));
        assert!(state.day.voters.contains(&new));
        assert!(state.discoveries.contains_key(&new));
    }

    #[test]
    fn test_roster_hides_roles_on_request() {
        let mut state = state_with(&["A"]);
        state.players[0].role = Some(Role::Seer);
        assert_eq!(state.roster(true)[0].role, Some(Role::Seer));
        assert_eq!(state.roster(false)[0].role, None);
    }
}
