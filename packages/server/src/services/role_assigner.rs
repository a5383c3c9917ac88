use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

use crate::models::{game::GameState, player::ConnectionId, role::Role};

/// Shuffles the configured pool and hands the roles out in roster order.
///
/// Returns each player's identity with the role they received, so the caller
/// can reveal it privately. If a seer was dealt, their discovery ledger is
/// started empty.
pub fn assign_roles<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Vec<(ConnectionId, Role)> {
    let mut roles = state.role_pool.roles().to_vec();
    roles.shuffle(rng);

    debug_assert_eq!(roles.len(), state.players.len());

    let mut dealt = Vec::with_capacity(roles.len());
    for (player, role) in state.players.iter_mut().zip(roles) {
        player.role = Some(role.clone());
        dealt.push((player.id, role));
    }

    if let Some(seer) = state.players.iter().find(|p| p.has_role(&Role::Seer)) {
        state.discoveries.insert(seer.id, BTreeMap::new());
    }

    log::info!("roles dealt to {} players", dealt.len());
    dealt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{config::RolePool, player::Player};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn full_state(pool: RolePool) -> GameState {
        let mut state = GameState::new(pool);
        for i in 0..state.required_players() {
            state
                .players
                .push(Player::new(ConnectionId::new(), format!("P{}", i)));
        }
        state
    }

    fn sorted(mut roles: Vec<String>) -> Vec<String> {
        roles.sort();
        roles
    }

    #[test]
    fn test_assignment_conserves_pool() {
        let pool = RolePool::parse("werewolf\nwerewolf\nbodyguard\nseer\nvillager\nvillager\nvillager")
            .unwrap();
        let expected = sorted(pool.roles().iter().map(|r| r.to_string()).collect());

        for seed in 0..50 {
            let mut state = full_state(pool.clone());
            let mut rng = StdRng::seed_from_u64(seed);
            let dealt = assign_roles(&mut state, &mut rng);

            assert_eq!(dealt.len(), state.players.len());
            let assigned = sorted(
                state
                    .players
                    .iter()
                    .map(|p| p.role.as_ref().unwrap().to_string())
                    .collect(),
            );
            assert_eq!(assigned, expected);
        }
    }

    #[test]
    fn test_dealt_list_matches_roster() {
        let mut state = full_state(RolePool::parse("werewolf\nseer\nvillager").unwrap());
        let mut rng = StdRng::seed_from_u64(7);
        let dealt = assign_roles(&mut state, &mut rng);
        for (id, role) in dealt {
            assert_eq!(state.player(id).unwrap().role.as_ref(), Some(&role));
        }
    }

    #[test]
    fn test_seer_gets_empty_ledger() {
        let mut state = full_state(RolePool::parse("werewolf\nseer\nvillager").unwrap());
        let mut rng = StdRng::seed_from_u64(3);
        assign_roles(&mut state, &mut rng);
        let seer = state.living_with_role(&Role::Seer).unwrap().id;
        assert_eq!(state.discoveries.get(&seer), Some(&BTreeMap::new()));
    }

    #[test]
    fn test_no_ledger_without_seer() {
        let mut state = full_state(RolePool::parse("werewolf\nvillager").unwrap());
        let mut rng = StdRng::seed_from_u64(3);
        assign_roles(&mut state, &mut rng);
        assert!(state.discoveries.is_empty());
    }

    #[test]
    fn test_shuffle_varies_across_seeds() {
        let pool = RolePool::parse("werewolf\nbodyguard\nseer\nvillager").unwrap();
        let first_roles: std::collections::HashSet<String> = (0..40)
            .map(|seed| {
                let mut state = full_state(pool.clone());
                assign_roles(&mut state, &mut StdRng::seed_from_u64(seed));
                state.players[0].role.as_ref().unwrap().to_string()
            })
            .collect();
        assert!(first_roles.len() > 1);
    }
}
