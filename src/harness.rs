//! Online training harness.
//!
//! Runs `runs x epochs` epochs. Every epoch starts from a freshly initialised
//! network and trains it for `loops` steps, each on a newly generated board:
//!
//! - loop `0`: an extra training step, then the trained network picks a move
//!   (the "trained" series);
//! - loop `1`: the baseline evaluator picks a move from the current output (the
//!   "baseline" series);
//! - every loop: one training step.
//!
//! After the loops an [`Network::evaluation_clone`] of the network guesses on one
//! more unseen board (the "evaluation" series), so measuring never touches the
//! weights under training.

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::moves::{Move, baseline_move, best_move};
use crate::transform::{MaskConfig, randomize_mask, scrub_answer_board, scrub_visible_board};
use crate::{BoardSource, Error, Matrix, Network, NetworkShape, Result, RevealMask};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    pub runs: usize,
    pub epochs: usize,
    /// Training steps per epoch. Must be at least 2.
    pub loops: usize,
    pub shape: NetworkShape,
    pub mask: MaskConfig,
    /// `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Log a progress line every `report_every` epochs.
    pub report_every: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            runs: 1001,
            epochs: 1001,
            loops: 1001,
            shape: NetworkShape::default(),
            mask: MaskConfig::default(),
            seed: None,
            report_every: 1,
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            return Err(Error::InvalidConfig("runs must be > 0".to_owned()));
        }
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
        }
        if self.loops < 2 {
            return Err(Error::InvalidConfig(format!(
                "loops must be >= 2, got {}",
                self.loops
            )));
        }
        if self.report_every == 0 {
            return Err(Error::InvalidConfig("report_every must be > 0".to_owned()));
        }
        self.shape.validate()?;
        self.mask.validate()
    }
}

/// Running hit count and summed confidence of one series.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub hits: u64,
    pub confidence: f64,
}

impl Tally {
    pub fn record(&mut self, mv: &Move) {
        if mv.hit {
            self.hits += 1;
        }
        self.confidence += mv.confidence;
    }

    /// Hit percentage over `n` samples (`0.0` when `n == 0`).
    pub fn hit_rate(&self, n: u64) -> f64 {
        if n == 0 {
            return 0.0;
        }
        100.0 * self.hits as f64 / n as f64
    }

    pub fn mean_confidence(&self, n: u64) -> f64 {
        if n == 0 {
            return 0.0;
        }
        self.confidence / n as f64
    }
}

/// Counters carried across every epoch of a harness run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HarnessState {
    pub trained: Tally,
    pub baseline: Tally,
    pub evaluation: Tally,
    /// Completed epochs across all runs.
    pub iterations: u64,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub hits: u64,
    /// Percent.
    pub hit_rate: f64,
    pub mean_confidence: f64,
}

impl SeriesStats {
    fn from_tally(tally: &Tally, n: u64) -> Self {
        Self {
            hits: tally.hits,
            hit_rate: tally.hit_rate(n),
            mean_confidence: tally.mean_confidence(n),
        }
    }
}

/// Snapshot taken at the end of an epoch.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    pub run: usize,
    pub epoch: usize,
    pub iteration: u64,
    /// Age of the network trained during this epoch.
    pub age: u64,
    pub trained: SeriesStats,
    pub baseline: SeriesStats,
    pub evaluation: SeriesStats,
}

impl EpochReport {
    fn new(run: usize, epoch: usize, state: &HarnessState, age: u64) -> Self {
        let n = state.iterations;
        Self {
            run,
            epoch,
            iteration: n,
            age,
            trained: SeriesStats::from_tally(&state.trained, n),
            baseline: SeriesStats::from_tally(&state.baseline, n),
            evaluation: SeriesStats::from_tally(&state.evaluation, n),
        }
    }

    /// Evaluation hit rate minus trained hit rate, in percentage points.
    pub fn evaluation_vs_trained(&self) -> f64 {
        self.evaluation.hit_rate - self.trained.hit_rate
    }

    /// Evaluation hit rate minus baseline hit rate, in percentage points.
    pub fn evaluation_vs_baseline(&self) -> f64 {
        self.evaluation.hit_rate - self.baseline.hit_rate
    }
}

impl fmt::Display for EpochReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run {} epoch {} | trained {} {:.3}% | baseline {} {:.3}% | evaluation {} {:.3}% \
             | vs trained {:.3} vs baseline {:.3} | conf {:.3}/{:.3}/{:.3} | iteration {} age {}",
            self.run,
            self.epoch,
            self.trained.hits,
            self.trained.hit_rate,
            self.baseline.hits,
            self.baseline.hit_rate,
            self.evaluation.hits,
            self.evaluation.hit_rate,
            self.evaluation_vs_trained(),
            self.evaluation_vs_baseline(),
            self.trained.mean_confidence,
            self.baseline.mean_confidence,
            self.evaluation.mean_confidence,
            self.iteration,
            self.age,
        )
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessReport {
    pub state: HarnessState,
    pub last: Option<EpochReport>,
}

#[cfg(feature = "serde")]
impl HarnessReport {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::InvalidData(format!("failed to serialize report: {e}")))
    }
}

/// One board turned into a training pair.
struct Sample {
    mask: RevealMask,
    input: Matrix,
    answer: Matrix,
}

pub struct Harness<S> {
    cfg: HarnessConfig,
    source: S,
    rng: StdRng,
}

impl<S: BoardSource> Harness<S> {
    pub fn new(cfg: HarnessConfig, source: S) -> Result<Self> {
        cfg.validate()?;
        if source.shape() != cfg.shape.board() {
            let (rows, cols) = source.shape();
            return Err(Error::InvalidConfig(format!(
                "board source yields {rows}x{cols} boards, network expects {}x{}",
                cfg.shape.rows, cfg.shape.cols
            )));
        }

        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { cfg, source, rng })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.cfg
    }

    /// Run every configured epoch.
    pub fn run(&mut self) -> Result<HarnessReport> {
        log::info!(
            "training {} run(s) x {} epoch(s) x {} loop(s) on {}x{} boards (hidden {})",
            self.cfg.runs,
            self.cfg.epochs,
            self.cfg.loops,
            self.cfg.shape.rows,
            self.cfg.shape.cols,
            self.cfg.shape.hidden
        );

        let mut state = HarnessState::default();
        let mut last = None;
        for run in 0..self.cfg.runs {
            for epoch in 0..self.cfg.epochs {
                last = Some(self.run_epoch(&mut state, run, epoch)?);
            }
        }

        Ok(HarnessReport { state, last })
    }

    /// Train a fresh network for one epoch and update `state`.
    pub fn run_epoch(
        &mut self,
        state: &mut HarnessState,
        run: usize,
        epoch: usize,
    ) -> Result<EpochReport> {
        let Sample { input, answer, .. } = self.sample()?;
        let mut network = Network::new_with_rng(self.cfg.shape, input, answer, &mut self.rng)?;

        for l in 0..self.cfg.loops {
            let Sample {
                mask,
                input,
                answer,
            } = self.sample()?;
            network.set_sample(input, answer)?;

            // Reads the output of the previous step's feedforward.
            if l == 1 {
                state.baseline.record(&baseline_move(&network, &mask)?);
            }

            if l == 0 {
                network.train()?;
                network.feedforward()?;
                state.trained.record(&best_move(&network, &mask)?);
            }

            network.train()?;
        }

        let Sample {
            mask,
            input,
            answer,
        } = self.sample()?;
        let mut clone = network.evaluation_clone(input, answer)?;
        clone.feedforward()?;
        let mv = best_move(&clone, &mask)?;
        log::debug!(
            "evaluation move ({}, {}) confidence {:.3} hit {}",
            mv.row,
            mv.col,
            mv.confidence,
            mv.hit
        );
        state.evaluation.record(&mv);
        clone.backprop()?;

        state.iterations += 1;
        let report = EpochReport::new(run, epoch, state, network.age());
        if state.iterations % self.cfg.report_every as u64 == 0 {
            log::info!("{report}");
        }
        log::trace!("network after epoch {epoch}:\n{}", network.summary());

        Ok(report)
    }

    fn sample(&mut self) -> Result<Sample> {
        let board = self.source.next_board(&mut self.rng)?;
        let answer = scrub_answer_board(&board);
        let mask = randomize_mask(&answer, &self.cfg.mask, &mut self.rng)?;
        let input = scrub_visible_board(&board, &mask)?;
        Ok(Sample {
            mask,
            input,
            answer,
        })
    }
}
