//! Common types: board coordinates, action records and the rule errors
//! raised before anything is sent over the wire.

use core::fmt;
use core::str::FromStr;

use crate::chip::ChipKind;
use crate::config::{COLS, ROWS};

/// A cell on the 5×6 grid. Always in bounds once constructed.
///
/// On the wire a coordinate is the two-element array `[row, col]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(try_from = "[u8; 2]", into = "[u8; 2]"))]
pub struct Coord {
    row: u8,
    col: u8,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Result<Self, RuleError> {
        if row >= ROWS || col >= COLS {
            return Err(RuleError::OutOfBounds { row, col });
        }
        Ok(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    pub const fn row(self) -> usize {
        self.row as usize
    }

    pub const fn col(self) -> usize {
        self.col as usize
    }

    /// Row-major index into a flat cell array.
    pub const fn index(self) -> usize {
        self.row() * COLS + self.col()
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Coord::new(index / COLS, index % COLS).ok()
    }

    /// True when `other` is one step away horizontally or vertically.
    pub fn is_adjacent(self, other: Coord) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }

    /// In-bounds orthogonal neighbours.
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        const STEPS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        STEPS.into_iter().filter_map(move |(dr, dc)| {
            let r = self.row() as isize + dr;
            let c = self.col() as isize + dc;
            if r < 0 || c < 0 {
                return None;
            }
            Coord::new(r as usize, c as usize).ok()
        })
    }

    /// Every cell in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..ROWS * COLS).filter_map(Coord::from_index)
    }
}

impl TryFrom<[u8; 2]> for Coord {
    type Error = RuleError;

    fn try_from(value: [u8; 2]) -> Result<Self, Self::Error> {
        Coord::new(value[0] as usize, value[1] as usize)
    }
}

impl From<Coord> for [u8; 2] {
    fn from(c: Coord) -> Self {
        [c.row, c.col]
    }
}

/// Human notation: column letter then 1-based row, e.g. `B3`.
impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.col) as char, self.row + 1)
    }
}

impl FromStr for Coord {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let col_ch = chars
            .next()
            .ok_or(ParseError::BadCoord)?
            .to_ascii_uppercase();
        if !col_ch.is_ascii_uppercase() {
            return Err(ParseError::BadCoord);
        }
        let col = (col_ch as u8 - b'A') as usize;
        let row: usize = chars.as_str().parse().map_err(|_| ParseError::BadCoord)?;
        if row == 0 {
            return Err(ParseError::BadCoord);
        }
        Coord::new(row - 1, col).map_err(|_| ParseError::BadCoord)
    }
}

/// What a single action did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "snake_case"))]
pub enum Action {
    /// Moved into an empty cell.
    Move,
    /// Attacker removed the defender and took its cell.
    AttackSuccess,
    /// Attacker was removed; defender stays.
    AttackFail,
    /// Athena took part: both chips removed.
    Fusion,
}

/// Fully resolved action as applied to both replicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveRecord {
    pub from: Coord,
    pub to: Coord,
    pub action: Action,
    /// New defeat marker of the chip left standing on `to`, when it changed.
    pub defeat: Option<ChipKind>,
}

/// Rule violations detected before a move is applied or sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    OutOfBounds { row: usize, col: usize },
    /// Source and target are not orthogonal neighbours.
    NotAdjacent,
    /// No chip on the source cell.
    EmptySource,
    /// Source chip belongs to the other side.
    NotOwnChip,
    /// Target holds a chip of the acting side.
    FriendlyTarget,
    NotYourTurn,
    /// No chip has been selected yet.
    NothingSelected,
    GameNotStarted,
    GameOver,
    /// A remote record disagrees with what this replica computes.
    Desync { expected: MoveRecord, received: MoveRecord },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::OutOfBounds { row, col } => {
                write!(f, "Cell ({}, {}) is outside the {}x{} board", row, col, ROWS, COLS)
            }
            RuleError::NotAdjacent => write!(f, "Target is not adjacent to the selected chip"),
            RuleError::EmptySource => write!(f, "There is no chip on the source cell"),
            RuleError::NotOwnChip => write!(f, "That chip belongs to the opponent"),
            RuleError::FriendlyTarget => write!(f, "Target cell holds one of your own chips"),
            RuleError::NotYourTurn => write!(f, "It is not your turn"),
            RuleError::NothingSelected => write!(f, "Select one of your chips first"),
            RuleError::GameNotStarted => write!(f, "The game has not started yet"),
            RuleError::GameOver => write!(f, "The game is over"),
            RuleError::Desync { expected, received } => write!(
                f,
                "Replica desync: computed {:?}, peer reported {:?}",
                expected, received
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RuleError {}

/// Errors from parsing user or CLI text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    UnknownKind,
    UnknownSide,
    BadCoord,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownKind => write!(f, "Unknown chip kind"),
            ParseError::UnknownSide => write!(f, "Side must be A or B"),
            ParseError::BadCoord => write!(
                f,
                "Invalid cell - use a column letter A-{} and a row 1-{} (e.g. B3)",
                (b'A' + COLS as u8 - 1) as char,
                ROWS
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}
