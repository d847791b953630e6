//! The 5×6 board and its seeded deterministic setup.

use alloc::vec::Vec;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::chip::{Chip, ChipKind, Side};
use crate::common::Coord;
use crate::config::{CHIPS_PER_SIDE, COLS, ROSTER, ROWS};

const CELLS: usize = ROWS * COLS;

/// Board replica. Each cell holds at most one chip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Chip>; CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// A board with no chips. Mostly useful for tests and custom setups.
    pub fn empty() -> Self {
        Self {
            cells: [None; CELLS],
        }
    }

    /// Build the opening position from a shared seed.
    ///
    /// All cells are shuffled with a ChaCha8 stream seeded from `seed`; side
    /// A's roster fills the first fifteen shuffled cells and side B's the
    /// rest. ChaCha8 output is fixed across platforms, so two replicas given
    /// the same seed always agree.
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut positions: Vec<Coord> = Coord::all().collect();
        positions.shuffle(&mut rng);

        let mut board = Board::empty();
        let mut slots = positions.into_iter();
        for side in Side::BOTH {
            for (kind, count) in ROSTER {
                for _ in 0..count {
                    if let Some(pos) = slots.next() {
                        board.place(pos, Chip::new(kind, side));
                    }
                }
            }
        }
        debug_assert_eq!(board.chip_count(Side::A), CHIPS_PER_SIDE);
        debug_assert_eq!(board.chip_count(Side::B), CHIPS_PER_SIDE);
        board
    }

    pub fn get(&self, at: Coord) -> Option<&Chip> {
        self.cells[at.index()].as_ref()
    }

    pub fn get_mut(&mut self, at: Coord) -> Option<&mut Chip> {
        self.cells[at.index()].as_mut()
    }

    /// Put a chip on a cell, returning whatever was there.
    pub fn place(&mut self, at: Coord, chip: Chip) -> Option<Chip> {
        self.cells[at.index()].replace(chip)
    }

    /// Remove and return the chip on a cell.
    pub fn take(&mut self, at: Coord) -> Option<Chip> {
        self.cells[at.index()].take()
    }

    /// Occupied cells in row-major order.
    pub fn chips(&self) -> impl Iterator<Item = (Coord, &Chip)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| Some((Coord::from_index(i)?, cell.as_ref()?)))
    }

    /// Cells holding chips of `side`.
    pub fn positions_of(&self, side: Side) -> impl Iterator<Item = Coord> + '_ {
        self.chips()
            .filter(move |(_, chip)| chip.side == side)
            .map(|(at, _)| at)
    }

    pub fn chip_count(&self, side: Side) -> usize {
        self.positions_of(side).count()
    }

    /// Surviving chips of `side` per ranked kind, in `ChipKind::RANKED` order.
    /// Athena is not counted.
    pub fn survivors(&self, side: Side) -> [usize; 6] {
        let mut counts = [0usize; 6];
        for (_, chip) in self.chips().filter(|(_, c)| c.side == side) {
            if let Some(slot) = ChipKind::RANKED.iter().position(|k| *k == chip.kind) {
                counts[slot] += 1;
            }
        }
        counts
    }

    /// Whether `side` has at least one legal action.
    pub fn has_action(&self, side: Side) -> bool {
        self.positions_of(side).any(|from| {
            from.neighbors()
                .any(|to| self.get(to).map_or(true, |c| c.side != side))
        })
    }

    /// FNV-1a digest of the full position, markers included. Two replicas
    /// in sync always report the same value.
    pub fn fingerprint(&self) -> u64 {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;
        let mut hash = OFFSET;
        for cell in &self.cells {
            let bytes: [u8; 3] = match cell {
                None => [0, 0, 0],
                Some(chip) => [
                    1 + chip.kind as u8,
                    1 + chip.side.index() as u8,
                    chip.defeat.map_or(0, |k| 1 + k as u8),
                ],
            };
            for b in bytes {
                hash ^= u64::from(b);
                hash = hash.wrapping_mul(PRIME);
            }
        }
        hash
    }
}
