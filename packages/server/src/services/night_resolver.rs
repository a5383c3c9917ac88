use rand::Rng;

use crate::models::{
    config::RuleConfig,
    event::ServerEvent,
    game::{GamePhase, GameState},
    player::ConnectionId,
    role::Role,
};
use crate::services::{game_service::GameError, notifier::Notifier, tie_break::TieBreak};

/// What a resolved night did, mostly for logging and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NightOutcome {
    pub candidate: Option<String>,
    pub eliminated: Option<String>,
    pub protected: bool,
    pub revealed: Option<(String, Role)>,
}

/// Records one night action.
///
/// `Ok(Some(ack))` means the action was recorded and `ack` should go back to
/// the actor. `Ok(None)` means the request was ignored: wrong phase, unknown,
/// dead or disconnected actor, or a role with nothing to do at night.
pub fn submit(
    state: &mut GameState,
    rules: &RuleConfig,
    actor: ConnectionId,
    target: &str,
) -> Result<Option<&'static str>, GameError> {
    if state.phase != GamePhase::Night {
        return Ok(None);
    }
    let Some(player) = state.player(actor).filter(|p| p.can_act()) else {
        return Ok(None);
    };
    let Some(role) = player.role.clone().filter(Role::acts_at_night) else {
        return Ok(None);
    };

    if role == Role::Werewolf && state.night.werewolf_voters.contains(&actor) {
        return Err(GameError::AlreadyVotedTonight);
    }
    if state.player_by_name(target).is_none() {
        return Err(GameError::UnknownTarget(target.to_string()));
    }

    match role {
        Role::Werewolf => {
            *state
                .night
                .werewolf_votes
                .entry(target.to_string())
                .or_insert(0) += 1;
            state.night.werewolf_voters.insert(actor);
            Ok(Some("Vote registered. Waiting for the rest..."))
        }
        Role::Bodyguard => {
            if rules.forbid_repeat_protection
                && state.last_protection.as_deref() == Some(target)
            {
                return Err(GameError::RepeatedProtection(target.to_string()));
            }
            state.night.protection = Some(target.to_string());
            Ok(Some("Protection given. Waiting for day..."))
        }
        Role::Seer => {
            state.night.seer_target = Some(target.to_string());
            Ok(Some("You have chosen someone to see..."))
        }
        _ => Ok(None),
    }
}

/// True once every night role with a living holder has submitted.
pub fn is_complete(state: &GameState) -> bool {
    let wolves_alive = state.living_werewolves();
    let wolves_done = wolves_alive == 0 || state.night.total_werewolf_votes() == wolves_alive;

    let bodyguard_done = state.living_with_role(&Role::Bodyguard).is_none()
        || state.night.protection.is_some();
    let seer_done =
        state.living_with_role(&Role::Seer).is_none() || state.night.seer_target.is_some();

    wolves_done && bodyguard_done && seer_done
}

/// Applies the collected night actions: werewolf kill unless protected, then
/// the seer's revelation. Clears the night buckets and broadcasts the roster.
pub fn resolve<R: Rng + ?Sized>(
    state: &mut GameState,
    rules: &RuleConfig,
    rng: &mut R,
    notifier: &dyn Notifier,
) -> NightOutcome {
    let mut outcome = NightOutcome::default();

    let tally: Vec<(String, usize)> = state
        .night
        .werewolf_votes
        .iter()
        .map(|(target, count)| (target.clone(), *count))
        .collect();
    outcome.candidate = TieBreak::Random.select(&tally, rng);

    if let Some(candidate) = outcome.candidate.clone() {
        if state.night.protection.as_deref() == Some(candidate.as_str()) {
            outcome.protected = true;
            log::info!("{} was attacked but protected", candidate);
        } else if let Some(victim) = state.player_by_name_mut(&candidate).filter(|p| p.alive) {
            victim.alive = false;
            let victim_id = victim.id;
            outcome.eliminated = Some(candidate.clone());
            log::info!("{} was killed during the night", candidate);
            notifier.send_to(victim_id, ServerEvent::YouDied);
        }
    }

    if let Some(target) = state.night.seer_target.clone() {
        let seer = state.living_with_role(&Role::Seer).map(|p| p.id);
        let target_role = state.player_by_name(&target).and_then(|p| p.role.clone());
        if let (Some(seer), Some(role)) = (seer, target_role) {
            let ledger = state.discoveries.entry(seer).or_default();
            ledger.insert(target.clone(), role.clone());
            let snapshot = ledger.clone();
            outcome.revealed = Some((target, role));
            notifier.send_to(seer, ServerEvent::SeerDiscoveriesUpdate(snapshot));
        }
    }

    state.last_protection = state.night.protection.take();
    state.clear_night();

    notifier.broadcast(ServerEvent::PlayersUpdate(
        state.roster(rules.reveal_roles_in_roster),
    ));

    outcome
}
