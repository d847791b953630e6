use rand::rngs::SmallRng;

use crate::ai::{self, AiChoice};

use super::{Player, TurnInput, TurnView};

/// Computer player backed by [`ai::choose_action`].
#[derive(Debug, Default)]
pub struct AiPlayer;

impl AiPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl Player for AiPlayer {
    fn poll_turn(&mut self, rng: &mut SmallRng, view: &TurnView<'_>) -> Option<TurnInput> {
        let choice = ai::choose_action(view.session.board(), view.me, rng);
        log::debug!("ai (side {}) chose {:?}", view.me, choice);
        Some(match choice {
            AiChoice::None => TurnInput::Pass,
            other => {
                let (from, to) = other.endpoints()?;
                TurnInput::Act { from, to }
            }
        })
    }
}
