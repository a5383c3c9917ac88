use crate::models::game::{GameState, Winner};

/// Werewolves lose when none are left alive and win once they are at least as
/// many as everyone else alive.
pub fn evaluate(state: &GameState) -> Option<Winner> {
    let wolves = state.living_werewolves();
    if wolves == 0 {
        Some(Winner::Villagers)
    } else if wolves >= state.living_non_werewolves() {
        Some(Winner::Werewolves)
    } else {
        None
    }
}

pub fn announcement(winner: Winner) -> &'static str {
    match winner {
        Winner::Villagers => "Villagers win! The werewolves have been eliminated.",
        Winner::Werewolves => "Werewolves win! The beasts have overpowered the villagers.",
    }
}
