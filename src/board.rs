//! Board grids and reveal masks.
//!
//! A [`Board`] is the raw output of a board generator: a grid of cell codes.
//! Codes `0..=4` are the five ship types, `8` is also a ship cell, `7` marks a
//! known "no ship" cell, and anything else is open water.

use std::fmt;

use crate::{Error, Result};

/// Highest code that still denotes a ship type.
pub const MAX_SHIP_CODE: u8 = 4;
/// Additional code that denotes a ship cell.
pub const SHIP_MARKER: u8 = 8;
/// Code for a cell known to hold no ship.
pub const NO_SHIP_MARKER: u8 = 7;
/// Code used for open water by [`crate::FleetGenerator`].
pub const WATER: u8 = 9;

/// Ship rule shared by the visible and answer encodings.
#[inline]
pub fn is_ship_code(code: u8) -> bool {
    code <= MAX_SHIP_CODE || code == SHIP_MARKER
}

/// Immutable `rows x cols` grid of cell codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl Board {
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self> {
        let (rows_n, cols, cells) = flatten_grid(rows, "board")?;
        Ok(Self {
            rows: rows_n,
            cols,
            cells,
        })
    }

    pub fn from_flat(rows: usize, cols: usize, cells: Vec<u8>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidData(format!(
                "board dims must be > 0, got {rows}x{cols}"
            )));
        }
        if cells.len() != rows * cols {
            return Err(Error::InvalidShape(format!(
                "board buffer len {} does not match {rows}x{cols}",
                cells.len()
            )));
        }
        Ok(Self { rows, cols, cells })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        self.cells[row * self.cols + col]
    }

    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Number of cells that hold a ship.
    pub fn ship_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| is_ship_code(c)).count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.chunks(self.cols).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, code) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{code}")?;
            }
        }
        Ok(())
    }
}

/// Which cells the network gets to see: `0` hidden, `1` revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealMask {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl RevealMask {
    pub const HIDDEN: u8 = 0;
    pub const REVEALED: u8 = 1;

    /// Build a mask from rows of `0`/`1`. Any other value is rejected.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self> {
        let (rows_n, cols, cells) = flatten_grid(rows, "mask")?;
        if let Some(bad) = cells.iter().find(|&&c| c > Self::REVEALED) {
            return Err(Error::InvalidData(format!(
                "mask values must be 0 or 1, got {bad}"
            )));
        }
        Ok(Self {
            rows: rows_n,
            cols,
            cells,
        })
    }

    /// A mask with every cell revealed.
    pub fn revealed(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "mask dims must be > 0");
        Self {
            rows,
            cols,
            cells: vec![Self::REVEALED; rows * cols],
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        self.cells[row * self.cols + col]
    }

    #[inline]
    pub fn is_hidden(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == Self::HIDDEN
    }

    #[inline]
    pub(crate) fn set(&mut self, row: usize, col: usize, hidden: bool) {
        self.cells[row * self.cols + col] = if hidden {
            Self::HIDDEN
        } else {
            Self::REVEALED
        };
    }

    pub fn hidden_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Self::HIDDEN).count()
    }

    /// Hidden cells in row-major order.
    pub fn hidden_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Self::HIDDEN)
            .map(move |(i, _)| (i / cols, i % cols))
    }
}

impl fmt::Display for RevealMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.chunks(self.cols).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for &c in row {
                write!(f, "{}", if c == Self::HIDDEN { '?' } else { '.' })?;
            }
        }
        Ok(())
    }
}

fn flatten_grid(rows: &[Vec<u8>], what: &str) -> Result<(usize, usize, Vec<u8>)> {
    let cols = rows.first().map(|r| r.len()).unwrap_or(0);
    if rows.is_empty() || cols == 0 {
        return Err(Error::InvalidData(format!("{what} must not be empty")));
    }

    let mut cells = Vec::with_capacity(rows.len() * cols);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != cols {
            return Err(Error::InvalidShape(format!(
                "{what} row {i} has len {}, expected {cols}",
                row.len()
            )));
        }
        cells.extend_from_slice(row);
    }
    Ok((rows.len(), cols, cells))
}
