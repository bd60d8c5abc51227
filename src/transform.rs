//! Board to tensor transforms.
//!
//! These turn one generated [`Board`] into a training pair for the network:
//!
//! - [`scrub_answer_board`]: the target, `1.0` on ship cells and `0.0` elsewhere.
//! - [`randomize_mask`]: which cells are left for the network to guess.
//! - [`scrub_visible_board`]: the input tensor given a board and a mask.

use rand::Rng;
use rand::distributions::{Distribution, Uniform};

use crate::board::{NO_SHIP_MARKER, is_ship_code};
use crate::{Board, Error, Matrix, Result, RevealMask};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Input value for a cell the network has no information about.
pub const UNKNOWN: f64 = 0.5;

/// Encode the network input.
///
/// Hidden cells (`mask == 0`) are encoded with the ship rule: ship cells become
/// `1.0`, the no-ship marker becomes `0.0` and everything else is [`UNKNOWN`].
/// Revealed cells are always [`UNKNOWN`].
pub fn scrub_visible_board(board: &Board, mask: &RevealMask) -> Result<Matrix> {
    if board.shape() != mask.shape() {
        return Err(Error::InvalidShape(format!(
            "board is {}x{} but mask is {}x{}",
            board.rows(),
            board.cols(),
            mask.rows(),
            mask.cols()
        )));
    }

    let mut out = Matrix::filled(board.rows(), board.cols(), UNKNOWN);
    for r in 0..board.rows() {
        for c in 0..board.cols() {
            if !mask.is_hidden(r, c) {
                continue;
            }
            let code = board.get(r, c);
            if is_ship_code(code) {
                out.set(r, c, 1.0);
            } else if code == NO_SHIP_MARKER {
                out.set(r, c, 0.0);
            }
        }
    }
    Ok(out)
}

/// Encode the training target: `1.0` exactly on ship cells.
pub fn scrub_answer_board(board: &Board) -> Matrix {
    let mut out = Matrix::zeros(board.rows(), board.cols());
    for r in 0..board.rows() {
        for c in 0..board.cols() {
            if is_ship_code(board.get(r, c)) {
                out.set(r, c, 1.0);
            }
        }
    }
    out
}

/// How reveal masks are drawn.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskConfig {
    /// A cell is hidden when its uniform draw is strictly above this value.
    pub hide_threshold: f64,
    /// Full-grid redraws before giving up with [`Error::NoValidMask`].
    pub max_attempts: usize,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            hide_threshold: 0.95,
            max_attempts: 10_000,
        }
    }
}

impl MaskConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.hide_threshold.is_finite() && (0.0..1.0).contains(&self.hide_threshold)) {
            return Err(Error::InvalidConfig(format!(
                "hide_threshold must be finite and in [0,1), got {}",
                self.hide_threshold
            )));
        }
        if self.max_attempts == 0 {
            return Err(Error::InvalidConfig("max_attempts must be > 0".to_owned()));
        }
        Ok(())
    }
}

/// Draw a reveal mask with at least one hidden hit and one hidden miss.
///
/// Each attempt redraws the whole grid. An answer tensor without any ship cell
/// (or without any empty cell) can never satisfy the requirement and fails
/// immediately.
pub fn randomize_mask<R: Rng + ?Sized>(
    answer: &Matrix,
    cfg: &MaskConfig,
    rng: &mut R,
) -> Result<RevealMask> {
    cfg.validate()?;

    let hits = answer.as_slice().iter().filter(|&&v| v == 1.0).count();
    if hits == 0 || hits == answer.as_slice().len() {
        return Err(Error::NoValidMask { attempts: 0 });
    }

    let (rows, cols) = answer.shape();
    let dist = Uniform::new(0.0_f64, 1.0_f64);
    let mut mask = RevealMask::revealed(rows, cols);

    for attempt in 1..=cfg.max_attempts {
        let mut hidden_hit = false;
        let mut hidden_miss = false;

        for r in 0..rows {
            for c in 0..cols {
                let hidden = dist.sample(rng) > cfg.hide_threshold;
                mask.set(r, c, hidden);
                if hidden {
                    if answer.get(r, c) == 1.0 {
                        hidden_hit = true;
                    } else {
                        hidden_miss = true;
                    }
                }
            }
        }

        if hidden_hit && hidden_miss {
            log::trace!("mask accepted after {attempt} attempt(s)");
            return Ok(mask);
        }
    }

    Err(Error::NoValidMask {
        attempts: cfg.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_board() -> Board {
        Board::from_rows(&[
            vec![0, 9, 7, 5],
            vec![8, 4, 9, 6],
            vec![9, 9, 3, 7],
        ])
        .unwrap()
    }

    #[test]
    fn answer_marks_exactly_the_ship_cells() {
        let board = sample_board();
        let answer = scrub_answer_board(&board);
        let expected = Matrix::from_rows(&[
            vec![1.0, 0.0, 0.0, 0.0],
            vec![1.0, 1.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0],
        ])
        .unwrap();
        assert_eq!(answer, expected);
    }

    #[test]
    fn visible_board_encodes_hidden_cells_only() {
        let board = sample_board();
        let mask = RevealMask::from_rows(&[
            vec![0, 0, 0, 1],
            vec![1, 1, 1, 1],
            vec![1, 1, 0, 0],
        ])
        .unwrap();
        let input = scrub_visible_board(&board, &mask).unwrap();
        let expected = Matrix::from_rows(&[
            vec![1.0, 0.5, 0.0, 0.5],
            vec![0.5, 0.5, 0.5, 0.5],
            vec![0.5, 0.5, 1.0, 0.0],
        ])
        .unwrap();
        assert_eq!(input, expected);
    }

    #[test]
    fn visible_board_rejects_mismatched_mask() {
        let board = sample_board();
        let mask = RevealMask::revealed(2, 2);
        assert!(matches!(
            scrub_visible_board(&board, &mask),
            Err(Error::InvalidShape(_))
        ));
    }

    #[test]
    fn mask_has_hidden_hit_and_hidden_miss() {
        let answer = scrub_answer_board(&sample_board());
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let mask = randomize_mask(&answer, &MaskConfig::default(), &mut rng).unwrap();
            let hits = mask
                .hidden_cells()
                .filter(|&(r, c)| answer.get(r, c) == 1.0)
                .count();
            assert!(hits >= 1);
            assert!(mask.hidden_count() > hits);
        }
    }

    #[test]
    fn mask_fails_fast_without_ships() {
        let board = Board::from_rows(&[vec![9, 7], vec![5, 6]]).unwrap();
        let answer = scrub_answer_board(&board);
        let mut rng = StdRng::seed_from_u64(0);
        let err = randomize_mask(&answer, &MaskConfig::default(), &mut rng).unwrap_err();
        assert_eq!(err, Error::NoValidMask { attempts: 0 });
    }

    #[test]
    fn mask_gives_up_after_max_attempts() {
        // Threshold 0.999999 almost never hides anything.
        let answer = scrub_answer_board(&sample_board());
        let cfg = MaskConfig {
            hide_threshold: 0.999_999,
            max_attempts: 3,
        };
        let mut rng = StdRng::seed_from_u64(0);
        let err = randomize_mask(&answer, &cfg, &mut rng).unwrap_err();
        assert_eq!(err, Error::NoValidMask { attempts: 3 });
    }

    #[test]
    fn mask_config_validation() {
        assert!(MaskConfig::default().validate().is_ok());
        let bad = MaskConfig {
            hide_threshold: 1.0,
            ..MaskConfig::default()
        };
        assert!(bad.validate().is_err());
        let bad = MaskConfig {
            max_attempts: 0,
            ..MaskConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
