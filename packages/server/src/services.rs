pub mod day_resolver;
pub mod game_service;
pub mod night_resolver;
pub mod notifier;
pub mod role_assigner;
pub mod tie_break;
pub mod win_evaluator;
