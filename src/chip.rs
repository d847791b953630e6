//! Chip kinds, sides and the chip record stored in each board cell.

use core::fmt;
use core::str::FromStr;

use crate::common::ParseError;

/// The seven chip kinds. `Athena` has no rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum ChipKind {
    Orichi,
    Yagami,
    Kula,
    K,
    Mai,
    Kyo,
    Athena,
}

impl ChipKind {
    pub const ALL: [ChipKind; 7] = [
        ChipKind::Orichi,
        ChipKind::Yagami,
        ChipKind::Kula,
        ChipKind::K,
        ChipKind::Mai,
        ChipKind::Kyo,
        ChipKind::Athena,
    ];

    /// Ranked kinds from highest to lowest. This is also the order in which
    /// the terminal tally compares survivors.
    pub const RANKED: [ChipKind; 6] = [
        ChipKind::Orichi,
        ChipKind::Yagami,
        ChipKind::Kula,
        ChipKind::K,
        ChipKind::Mai,
        ChipKind::Kyo,
    ];

    /// Rank of the kind, higher is stronger. `None` for athena.
    pub const fn rank(self) -> Option<u8> {
        match self {
            ChipKind::Kyo => Some(1),
            ChipKind::Mai => Some(2),
            ChipKind::K => Some(3),
            ChipKind::Kula => Some(4),
            ChipKind::Yagami => Some(5),
            ChipKind::Orichi => Some(6),
            ChipKind::Athena => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ChipKind::Orichi => "orichi",
            ChipKind::Yagami => "yagami",
            ChipKind::Kula => "kula",
            ChipKind::K => "k",
            ChipKind::Mai => "mai",
            ChipKind::Kyo => "kyo",
            ChipKind::Athena => "athena",
        }
    }
}

impl fmt::Display for ChipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChipKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChipKind::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(ParseError::UnknownKind)
    }
}

/// One of the two participants. Over the network these are "A" and "B";
/// in a local match A is the human and B the AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    pub const fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Index into per-side arrays.
    pub const fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    /// Label used by the local player-vs-AI mode.
    pub const fn local_label(self) -> &'static str {
        match self {
            Side::A => "Player",
            Side::B => "AI",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

impl FromStr for Side {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Side::A),
            "B" | "b" => Ok(Side::B),
            _ => Err(ParseError::UnknownSide),
        }
    }
}

/// A chip on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chip {
    pub kind: ChipKind,
    pub side: Side,
    /// Highest-ranked opposing kind this chip has beaten so far.
    pub defeat: Option<ChipKind>,
}

impl Chip {
    pub const fn new(kind: ChipKind, side: Side) -> Self {
        Self {
            kind,
            side,
            defeat: None,
        }
    }
}
