//! Player trait and implementations
//!
//! A player is polled while it holds the turn and observes every game event:
//! - AiPlayer: the heuristic opponent from [`crate::ai`]
//! - CliPlayer: interactive terminal player

use std::time::Duration;

use rand::rngs::SmallRng;

pub use crate::arbiter::TurnInput;
use crate::{
    arbiter::GameEvent,
    chip::Side,
    common::{Coord, RuleError},
    game::GameSession,
};

/// Read-only snapshot handed to a player on its turn.
pub struct TurnView<'a> {
    pub session: &'a GameSession,
    pub me: Side,
    pub selected: Option<Coord>,
    pub time_left: Option<Duration>,
}

/// Interface implemented by different player types.
pub trait Player: Send {
    /// Called once per tick during our turn. `None` means no decision yet.
    fn poll_turn(&mut self, rng: &mut SmallRng, view: &TurnView<'_>) -> Option<TurnInput>;

    /// Inform the player of something that happened in the game.
    fn on_event(&mut self, _session: Option<&GameSession>, _me: Option<Side>, _event: &GameEvent) {}

    /// The last input was refused; the turn continues.
    fn on_rejected(&mut self, _input: &TurnInput, _error: &RuleError) {}
}

pub mod ai;
pub use ai::AiPlayer;

pub mod cli;
pub use cli::CliPlayer;
