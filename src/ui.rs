#![cfg(feature = "std")]
//! Text rendering of a board replica and game events.
//!
//! Everything here is drawn from one side's point of view: own chips show
//! their kind, enemy chips only show the defeat marker they carry.

use std::fmt::Write as _;
use std::time::Duration;

use crate::{
    arbiter::GameEvent,
    board::Board,
    chip::{Chip, ChipKind, Side},
    combat::Verdict,
    common::{Action, Coord},
    config::{COLS, ROWS},
    game::{EndReason, GameOutcome, GameSession},
};

fn short(kind: ChipKind) -> &'static str {
    match kind {
        ChipKind::Orichi => "ORI",
        ChipKind::Yagami => "YAG",
        ChipKind::Kula => "KUL",
        ChipKind::K => "K",
        ChipKind::Mai => "MAI",
        ChipKind::Kyo => "KYO",
        ChipKind::Athena => "ATH",
    }
}

/// Cell text for one chip as `viewer` sees it.
pub fn chip_glyph(chip: &Chip, viewer: Side) -> String {
    if chip.side == viewer {
        short(chip.kind).to_string()
    } else {
        match chip.defeat {
            Some(marker) => format!("x{}", short(marker).to_ascii_lowercase()),
            None => "???".to_string(),
        }
    }
}

/// Grid with column letters and 1-based row numbers. The selected cell is
/// bracketed.
pub fn render_board(board: &Board, viewer: Side, selected: Option<Coord>) -> String {
    let mut out = String::new();
    out.push_str("    ");
    for c in 0..COLS {
        let _ = write!(out, "  {}   ", (b'A' + c as u8) as char);
    }
    out.push('\n');
    for r in 0..ROWS {
        let _ = write!(out, " {:2} ", r + 1);
        for c in 0..COLS {
            let Ok(at) = Coord::new(r, c) else { continue };
            let text = board
                .get(at)
                .map(|chip| chip_glyph(chip, viewer))
                .unwrap_or_else(|| ".".to_string());
            if selected == Some(at) {
                let _ = write!(out, "[{:^4}]", text);
            } else {
                let _ = write!(out, " {:^4} ", text);
            }
        }
        out.push('\n');
    }
    out.push_str("    own chips show their kind; ??? = unknown enemy, xkyo = enemy that beat a kyo\n");
    out
}

/// One-line summary of whose turn it is and how the counters stand.
pub fn status_line(session: &GameSession, me: Side, time_left: Option<Duration>) -> String {
    let turn = if session.current_side() == me {
        "your turn".to_string()
    } else {
        format!("waiting for side {}", me.opponent())
    };
    let mut line = format!(
        "round {}/{} | {} | chips {} vs {} | idle {}/{}",
        session.turn_count(),
        session.rules().max_turns,
        turn,
        session.board().chip_count(me),
        session.board().chip_count(me.opponent()),
        session.idle_count(me),
        session.rules().max_idle_turns,
    );
    if let Some(left) = time_left {
        let _ = write!(line, " | {}s left", left.as_secs());
    }
    line
}

fn describe_action(action: Action) -> &'static str {
    match action {
        Action::Move => "moved",
        Action::AttackSuccess => "attacked and won",
        Action::AttackFail => "attacked and lost",
        Action::Fusion => "fused",
    }
}

/// Log line for an event, from `me`'s point of view.
pub fn describe_event(event: &GameEvent, me: Option<Side>) -> String {
    let who = |side: Side| {
        if Some(side) == me {
            "you".to_string()
        } else {
            format!("side {}", side)
        }
    };
    match event {
        GameEvent::Welcomed(side) => format!("seated as side {}", side),
        GameEvent::Started { first, seed, .. } => {
            format!("game started (seed {}); {} move first", seed, who(*first))
        }
        GameEvent::Applied { side, record } => format!(
            "{} {} {} -> {}",
            who(*side),
            describe_action(record.action),
            record.from,
            record.to
        ),
        GameEvent::Idled { side } => format!("{} passed", who(*side)),
        GameEvent::Ended(outcome) => outcome_text(outcome, me),
    }
}

fn reason_text(reason: EndReason) -> String {
    match reason {
        EndReason::TurnLimit => "turn limit reached".to_string(),
        EndReason::Eliminated => "a side was eliminated".to_string(),
        EndReason::IdleForfeit(side) => format!("side {} idled too long", side),
        EndReason::PeerDisconnected => "opponent disconnected".to_string(),
        EndReason::ConnectionLost => "connection lost".to_string(),
        EndReason::ProtocolViolation => "protocol violation".to_string(),
    }
}

/// Final banner text.
pub fn outcome_text(outcome: &GameOutcome, me: Option<Side>) -> String {
    let verdict = match (outcome.verdict, me) {
        (Verdict::Winner(side), Some(me)) if side == me => "You win".to_string(),
        (Verdict::Winner(_), Some(_)) => "You lose".to_string(),
        (Verdict::Winner(side), None) => format!("Side {} wins", side),
        (Verdict::Draw, _) => "Draw".to_string(),
        (Verdict::NoContest, _) => "No contest".to_string(),
    };
    format!("{} ({})", verdict, reason_text(outcome.reason))
}
