//! Combat resolution, defeat-marker bookkeeping and the terminal tally.
//!
//! Everything here is deterministic and free of I/O: both replicas call the
//! same functions on identical boards and must land on identical results.

use core::cmp::Ordering;

use crate::board::Board;
use crate::chip::{ChipKind, Side};
use crate::common::{Action, Coord, MoveRecord, RuleError};

/// Outcome of one chip attacking another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encounter {
    /// Athena took part; both chips are removed.
    Fusion,
    AttackerWins,
    AttackerLoses,
}

/// Whether `attacker` beats `defender`.
///
/// Returns `None` when athena is involved: such encounters are never a win
/// or a loss, they always end in fusion.
pub fn can_attack(attacker: ChipKind, defender: ChipKind) -> Option<bool> {
    let (a, d) = (attacker.rank()?, defender.rank()?);
    let wins = match (attacker, defender) {
        (ChipKind::Kyo, ChipKind::Orichi) => true,
        (ChipKind::Orichi, ChipKind::Kyo) => false,
        _ if attacker == defender => true,
        _ => a > d,
    };
    Some(wins)
}

pub fn resolve(attacker: ChipKind, defender: ChipKind) -> Encounter {
    match can_attack(attacker, defender) {
        None => Encounter::Fusion,
        Some(true) => Encounter::AttackerWins,
        Some(false) => Encounter::AttackerLoses,
    }
}

/// Whether a chip whose marker is `current` should record `defeated`.
///
/// Markers only ever move up the rank table; athena never overwrites a
/// marker, but any ranked kind overwrites an athena marker.
pub fn should_update_defeat(current: Option<ChipKind>, defeated: ChipKind) -> bool {
    let Some(current) = current else {
        return true;
    };
    if defeated == ChipKind::Athena {
        return false;
    }
    if current == ChipKind::Athena {
        return true;
    }
    defeated.rank() > current.rank()
}

/// Work out what moving `from` → `to` would do for `side`, without
/// touching the board.
pub fn plan(board: &Board, side: Side, from: Coord, to: Coord) -> Result<MoveRecord, RuleError> {
    let attacker = board.get(from).ok_or(RuleError::EmptySource)?;
    if attacker.side != side {
        return Err(RuleError::NotOwnChip);
    }
    if !from.is_adjacent(to) {
        return Err(RuleError::NotAdjacent);
    }
    let Some(defender) = board.get(to) else {
        return Ok(MoveRecord {
            from,
            to,
            action: Action::Move,
            defeat: None,
        });
    };
    if defender.side == side {
        return Err(RuleError::FriendlyTarget);
    }

    let record = match resolve(attacker.kind, defender.kind) {
        Encounter::Fusion => MoveRecord {
            from,
            to,
            action: Action::Fusion,
            defeat: None,
        },
        Encounter::AttackerWins => MoveRecord {
            from,
            to,
            action: Action::AttackSuccess,
            defeat: should_update_defeat(attacker.defeat, defender.kind).then_some(defender.kind),
        },
        Encounter::AttackerLoses => MoveRecord {
            from,
            to,
            action: Action::AttackFail,
            defeat: should_update_defeat(defender.defeat, attacker.kind).then_some(attacker.kind),
        },
    };
    Ok(record)
}

/// Apply a planned record. The record must come from [`plan`] on this
/// same position.
pub fn commit(board: &mut Board, record: &MoveRecord) {
    match record.action {
        Action::Move | Action::AttackSuccess => {
            if let Some(chip) = board.take(record.from) {
                board.place(record.to, chip);
            }
        }
        Action::AttackFail => {
            board.take(record.from);
        }
        Action::Fusion => {
            board.take(record.from);
            board.take(record.to);
        }
    }
    if let (Some(kind), Some(survivor)) = (record.defeat, board.get_mut(record.to)) {
        survivor.defeat = Some(kind);
    }
}

/// Final result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Winner(Side),
    Draw,
    /// The session ended without a game result (connection lost, protocol
    /// violation, or the game never started).
    NoContest,
}

/// Decide the winner from surviving material.
///
/// Survivor counts are compared kind by kind from orichi down to kyo; the
/// first kind with unequal counts decides outright.
pub fn tally(board: &Board) -> Verdict {
    let a = board.survivors(Side::A);
    let b = board.survivors(Side::B);
    for (ours, theirs) in a.iter().zip(b.iter()) {
        match ours.cmp(theirs) {
            Ordering::Greater => return Verdict::Winner(Side::A),
            Ordering::Less => return Verdict::Winner(Side::B),
            Ordering::Equal => {}
        }
    }
    Verdict::Draw
}
