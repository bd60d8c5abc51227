//! A two-layer network that learns where ships hide on a battleship board.
//!
//! `battleship-mlp` is a small, from-scratch numeric engine: dense `f64` matrices, a
//! two-layer sigmoid network with hand-written backprop, and the board transforms
//! that turn a generated board into training tensors. A harness trains the network
//! online against freshly generated boards and compares its guesses with a
//! non-learning baseline.
//!
//! # Pipeline
//!
//! - [`BoardSource`] yields a [`Board`] of cell codes.
//! - [`transform`] derives the target ([`scrub_answer_board`]), a [`RevealMask`]
//!   ([`randomize_mask`]) and the input ([`scrub_visible_board`]).
//! - [`Network`] trains on the pair ([`Network::train`]).
//! - [`moves`] picks a hidden cell from the network output and checks it against
//!   the target.
//! - [`Harness`] drives all of it and keeps hit statistics.
//!
//! # Errors
//!
//! Shape mismatches return [`Error::InvalidShape`]; nothing is silently broadcast
//! or truncated. A board that cannot yield a mask with both a hidden hit and a
//! hidden miss returns [`Error::NoValidMask`].
//!
//! # Numeric conventions
//!
//! The update rule is kept deliberately raw: the sigmoid is `1 / (1 + e^(-x/10))`,
//! the error signal is `2 * (target - output)` and gradients are added to the weights
//! with no learning rate.
//!
//! # Quick start
//!
//! ```rust
//! use battleship_mlp::{FleetGenerator, Harness, HarnessConfig, NetworkShape};
//!
//! # fn main() -> battleship_mlp::Result<()> {
//! let cfg = HarnessConfig {
//!     runs: 1,
//!     epochs: 3,
//!     loops: 10,
//!     shape: NetworkShape::square(8),
//!     seed: Some(0),
//!     ..HarnessConfig::default()
//! };
//! let mut harness = Harness::new(cfg, FleetGenerator::classic(8)?)?;
//! let report = harness.run()?;
//! assert_eq!(report.state.iterations, 3);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod board;
pub mod error;
pub mod harness;
pub(crate) mod matmul;
pub mod matrix;
pub mod moves;
pub mod network;
pub mod source;
pub mod transform;

pub use board::{Board, RevealMask};
pub use error::{Error, Result};
pub use harness::{
    EpochReport, Harness, HarnessConfig, HarnessReport, HarnessState, SeriesStats, Tally,
};
pub use matrix::Matrix;
pub use moves::{Move, baseline_move, best_move};
pub use network::{Network, NetworkShape};
pub use source::{BoardSource, FixedBoard, FleetGenerator};
pub use transform::{MaskConfig, randomize_mask, scrub_answer_board, scrub_visible_board};
