//! Picking a cell to fire at.
//!
//! Both evaluators only look at hidden cells, visited in row-major order. The
//! chosen cell is checked against the network's target to decide hit or miss.

use crate::{Error, Matrix, Network, Result, RevealMask};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    pub hit: bool,
    /// Raw network output at the chosen cell.
    pub confidence: f64,
    pub row: usize,
    pub col: usize,
}

/// Highest-output hidden cell of `network`.
pub fn best_move(network: &Network, mask: &RevealMask) -> Result<Move> {
    best_move_in(network.output(), network.target(), mask)
}

/// Last hidden cell of `network`, ignoring its output. Used as a baseline.
pub fn baseline_move(network: &Network, mask: &RevealMask) -> Result<Move> {
    baseline_move_in(network.output(), network.target(), mask)
}

/// Highest-output hidden cell.
///
/// The running best starts at `0.0` and is only replaced by a strictly greater
/// value, so ties go to the first cell in row-major order. If no hidden cell
/// beats `0.0` the move is `(0, 0)` with confidence `0.0`.
pub fn best_move_in(output: &Matrix, target: &Matrix, mask: &RevealMask) -> Result<Move> {
    check_shapes(output, target, mask)?;

    let (mut best, mut row, mut col) = (0.0_f64, 0, 0);
    for (r, c) in mask.hidden_cells() {
        let v = output.get(r, c);
        if v > best {
            best = v;
            row = r;
            col = c;
        }
    }

    Ok(Move {
        hit: target.get(row, col) == 1.0,
        confidence: best,
        row,
        col,
    })
}

/// Last hidden cell in row-major order, with its output as confidence.
pub fn baseline_move_in(output: &Matrix, target: &Matrix, mask: &RevealMask) -> Result<Move> {
    check_shapes(output, target, mask)?;

    let (row, col) = mask
        .hidden_cells()
        .last()
        .ok_or_else(|| Error::InvalidData("mask has no hidden cells".to_owned()))?;

    Ok(Move {
        hit: target.get(row, col) == 1.0,
        confidence: output.get(row, col),
        row,
        col,
    })
}

fn check_shapes(output: &Matrix, target: &Matrix, mask: &RevealMask) -> Result<()> {
    if output.shape() != target.shape() || output.shape() != mask.shape() {
        return Err(Error::InvalidShape(format!(
            "output {}x{}, target {}x{}, mask {}x{}",
            output.rows(),
            output.cols(),
            target.rows(),
            target.cols(),
            mask.rows(),
            mask.cols()
        )));
    }
    if mask.hidden_count() == 0 {
        return Err(Error::InvalidData("mask has no hidden cells".to_owned()));
    }
    Ok(())
}
