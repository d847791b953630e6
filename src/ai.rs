//! Heuristic opponent: picks one action per call from what its side can see.
//! It knows its own chips and the defeat markers shown on enemy chips, never
//! the enemy's true kinds. The result label (move/attack/fusion) reflects
//! what the board will do with the chosen action.

use alloc::vec::Vec;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{
    board::Board,
    chip::{ChipKind, Side},
    common::Coord,
};

/// Exactly one decision per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiChoice {
    Move { from: Coord, to: Coord },
    Attack { from: Coord, to: Coord },
    Fusion { from: Coord, to: Coord },
    /// No legal action; the turn is spent idle.
    None,
}

impl AiChoice {
    pub fn endpoints(self) -> Option<(Coord, Coord)> {
        match self {
            AiChoice::Move { from, to }
            | AiChoice::Attack { from, to }
            | AiChoice::Fusion { from, to } => Some((from, to)),
            AiChoice::None => None,
        }
    }
}

/// Choose an action for `side`.
pub fn choose_action<R: Rng + ?Sized>(board: &Board, side: Side, rng: &mut R) -> AiChoice {
    let mut candidates: Vec<(i32, AiChoice)> = Vec::new();
    for from in board.positions_of(side) {
        let Some(mine) = board.get(from) else { continue };
        for to in from.neighbors() {
            match board.get(to) {
                None => candidates.push((move_score(board, side, to), AiChoice::Move { from, to })),
                Some(theirs) if theirs.side != side => {
                    let choice = if mine.kind == ChipKind::Athena || theirs.kind == ChipKind::Athena {
                        AiChoice::Fusion { from, to }
                    } else {
                        AiChoice::Attack { from, to }
                    };
                    candidates.push((attack_score(mine.kind, theirs.defeat), choice));
                }
                Some(_) => {}
            }
        }
    }
    candidates.shuffle(rng);
    candidates
        .into_iter()
        .max_by_key(|(score, _)| *score)
        .map_or(AiChoice::None, |(_, choice)| choice)
}

/// Attacks are attractive unless the target's marker shows it has already
/// beaten something at least as strong as the attacker.
fn attack_score(attacker: ChipKind, target_marker: Option<ChipKind>) -> i32 {
    match (attacker.rank(), target_marker.and_then(ChipKind::rank)) {
        // Athena is a trade; use it on proven threats.
        (None, Some(_)) => 3,
        (None, None) => 1,
        (Some(_), None) => 2,
        (Some(ours), Some(shown)) if shown >= ours => -2,
        (Some(_), Some(_)) => 3,
    }
}

/// Prefer stepping next to enemy chips over drifting.
fn move_score(board: &Board, side: Side, to: Coord) -> i32 {
    let contact = to
        .neighbors()
        .filter(|n| board.get(*n).is_some_and(|c| c.side != side))
        .count();
    if contact > 0 {
        1
    } else {
        0
    }
}
