//! Board sources.
//!
//! The learning loop only needs "give me a fresh board"; how the board is laid
//! out is up to the [`BoardSource`]. [`FleetGenerator`] places a classic fleet at
//! random, [`FixedBoard`] hands back the same board every time.

use rand::Rng;

use crate::board::{MAX_SHIP_CODE, WATER};
use crate::{Board, Error, Result};

/// Produces one board per call, all of the same shape.
pub trait BoardSource {
    /// `(rows, cols)` of every board this source yields.
    fn shape(&self) -> (usize, usize);

    fn next_board<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Board>;
}

/// Classic fleet: carrier, battleship, cruiser, submarine, destroyer.
pub const CLASSIC_FLEET: [usize; 5] = [5, 4, 3, 3, 2];

/// Placements tried per ship before the fleet is declared not to fit.
const MAX_PLACEMENT_TRIES: usize = 1_000;

/// Random, non-overlapping horizontal/vertical placement of a fleet.
///
/// Ship `i` is written with cell code `i`; every other cell is [`WATER`].
#[derive(Debug, Clone)]
pub struct FleetGenerator {
    rows: usize,
    cols: usize,
    ships: Vec<usize>,
}

impl FleetGenerator {
    pub fn new(rows: usize, cols: usize, ships: &[usize]) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidConfig(format!(
                "board dims must be > 0, got {rows}x{cols}"
            )));
        }
        if ships.is_empty() {
            return Err(Error::InvalidConfig("fleet must not be empty".to_owned()));
        }
        if ships.len() > MAX_SHIP_CODE as usize + 1 {
            return Err(Error::InvalidConfig(format!(
                "at most {} ships are supported, got {}",
                MAX_SHIP_CODE as usize + 1,
                ships.len()
            )));
        }
        if let Some(&len) = ships.iter().find(|&&l| l == 0 || l > rows.max(cols)) {
            return Err(Error::InvalidConfig(format!(
                "ship length {len} does not fit a {rows}x{cols} board"
            )));
        }
        if ships.iter().sum::<usize>() >= rows * cols {
            return Err(Error::InvalidConfig(format!(
                "fleet of {} cells leaves no water on a {rows}x{cols} board",
                ships.iter().sum::<usize>()
            )));
        }

        Ok(Self {
            rows,
            cols,
            ships: ships.to_vec(),
        })
    }

    /// `n x n` board with the [`CLASSIC_FLEET`].
    pub fn classic(n: usize) -> Result<Self> {
        Self::new(n, n, &CLASSIC_FLEET)
    }

    fn try_place<R: Rng + ?Sized>(
        &self,
        cells: &mut [u8],
        len: usize,
        code: u8,
        rng: &mut R,
    ) -> bool {
        let horizontal = rng.gen_bool(0.5);
        let (max_r, max_c) = if horizontal {
            (self.rows, self.cols + 1 - len.min(self.cols + 1))
        } else {
            (self.rows + 1 - len.min(self.rows + 1), self.cols)
        };
        if max_r == 0 || max_c == 0 {
            return false;
        }

        let r0 = rng.gen_range(0..max_r);
        let c0 = rng.gen_range(0..max_c);
        let idx = |k: usize| {
            if horizontal {
                r0 * self.cols + c0 + k
            } else {
                (r0 + k) * self.cols + c0
            }
        };

        if (0..len).any(|k| cells[idx(k)] != WATER) {
            return false;
        }
        for k in 0..len {
            cells[idx(k)] = code;
        }
        true
    }
}

impl BoardSource for FleetGenerator {
    fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn next_board<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Board> {
        let mut cells = vec![WATER; self.rows * self.cols];

        for (code, &len) in self.ships.iter().enumerate() {
            let placed = (0..MAX_PLACEMENT_TRIES)
                .any(|_| self.try_place(&mut cells, len, code as u8, rng));
            if !placed {
                return Err(Error::InvalidConfig(format!(
                    "could not place ship {code} (len {len}) on a {}x{} board",
                    self.rows, self.cols
                )));
            }
        }

        Board::from_flat(self.rows, self.cols, cells)
    }
}

/// Always yields a clone of the same board.
#[derive(Debug, Clone)]
pub struct FixedBoard {
    board: Board,
}

impl FixedBoard {
    pub fn new(board: Board) -> Self {
        Self { board }
    }
}

impl BoardSource for FixedBoard {
    fn shape(&self) -> (usize, usize) {
        self.board.shape()
    }

    fn next_board<R: Rng + ?Sized>(&mut self, _rng: &mut R) -> Result<Board> {
        Ok(self.board.clone())
    }
}
