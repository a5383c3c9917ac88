use rand::Rng;

use crate::models::{
    config::{DayQuorum, RuleConfig},
    event::ServerEvent,
    game::{DayVote, GamePhase, GameState},
    player::ConnectionId,
};
use crate::services::{
    game_service::GameError,
    notifier::Notifier,
    tie_break::{tally_in_order, TieBreak},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayOutcome {
    pub tally: Vec<(String, usize)>,
    pub eliminated: Option<String>,
}

/// Records one day vote. Same return convention as the night resolver.
pub fn submit(
    state: &mut GameState,
    actor: ConnectionId,
    target: &str,
) -> Result<Option<&'static str>, GameError> {
    if state.phase != GamePhase::Day {
        return Ok(None);
    }
    let Some(voter) = state.player(actor).filter(|p| p.can_act()).map(|p| p.name.clone()) else {
        return Ok(None);
    };
    if state.day.voters.contains(&actor) {
        return Err(GameError::AlreadyVotedToday);
    }
    if state.player_by_name(target).is_none() {
        return Err(GameError::UnknownTarget(target.to_string()));
    }

    state.day.votes.push(DayVote {
        voter,
        target: target.to_string(),
    });
    state.day.voters.insert(actor);
    Ok(Some("Vote cast."))
}

pub fn is_complete(state: &GameState, quorum: DayQuorum) -> bool {
    match quorum {
        DayQuorum::AllAlive => state.day.votes.len() == state.living_count(),
        DayQuorum::ConnectedAlive => {
            !state.day.votes.is_empty()
                && state
                    .players
                    .iter()
                    .filter(|p| p.can_act())
                    .all(|p| state.day.voters.contains(&p.id))
        }
    }
}

/// Eliminates the most-voted player. Ties go to whichever tied target was
/// voted for first.
pub fn resolve<R: Rng + ?Sized>(
    state: &mut GameState,
    rules: &RuleConfig,
    rng: &mut R,
    notifier: &dyn Notifier,
) -> DayOutcome {
    let tally = tally_in_order(state.day.votes.iter().map(|v| v.target.as_str()));
    let mut outcome = DayOutcome {
        eliminated: None,
        tally,
    };

    if let Some(target) = TieBreak::FirstSeen.select(&outcome.tally, rng) {
        if let Some(victim) = state.player_by_name_mut(&target).filter(|p| p.alive) {
            victim.alive = false;
            let victim_id = victim.id;
            log::info!("{} was voted out", target);
            notifier.send_to(victim_id, ServerEvent::YouDied);
            outcome.eliminated = Some(target);
        }
    }

    state.clear_day();

    notifier.broadcast(ServerEvent::PlayersUpdate(
        state.roster(rules.reveal_roles_in_roster),
    ));

    outcome
}
