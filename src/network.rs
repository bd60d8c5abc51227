use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Error, Matrix, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed network dimensions.
///
/// Inputs, targets and outputs are `rows x cols` board tensors. The board is
/// multiplied from the left, so the layers look like:
///
/// - `hidden = sigmoid(input (rows x cols) * w1 (cols x hidden))`, shape `rows x hidden`
/// - `output = sigmoid(hidden (rows x hidden) * w2 (hidden x cols))`, shape `rows x cols`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkShape {
    pub rows: usize,
    pub cols: usize,
    pub hidden: usize,
}

impl NetworkShape {
    /// `n x n` boards with a hidden width of `n`.
    pub fn square(n: usize) -> Self {
        Self {
            rows: n,
            cols: n,
            hidden: n,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 || self.hidden == 0 {
            return Err(Error::InvalidConfig(format!(
                "network dims must be > 0, got rows={} cols={} hidden={}",
                self.rows, self.cols, self.hidden
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn board(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn check_board(&self, m: &Matrix, what: &str) -> Result<()> {
        if m.shape() != self.board() {
            return Err(Error::InvalidShape(format!(
                "{what} is {}x{}, network expects {}x{}",
                m.rows(),
                m.cols(),
                self.rows,
                self.cols
            )));
        }
        Ok(())
    }
}

impl Default for NetworkShape {
    fn default() -> Self {
        Self::square(8)
    }
}

/// Two-layer sigmoid network trained on one board at a time.
///
/// The network owns its current sample (input and target) so that [`Network::train`]
/// is a single step with no arguments. Replace the sample with
/// [`Network::set_sample`].
#[derive(Debug, Clone)]
pub struct Network {
    shape: NetworkShape,
    input: Matrix,
    target: Matrix,
    w1: Matrix,
    w2: Matrix,
    /// `None` until the first feedforward.
    hidden: Option<Matrix>,
    output: Matrix,
    age: u64,
}

impl Network {
    pub fn new_with_seed(
        shape: NetworkShape,
        input: Matrix,
        target: Matrix,
        seed: u64,
    ) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(shape, input, target, &mut rng)
    }

    /// Build a network with `U[0, 1)` weights.
    ///
    /// `w1` is drawn from `rng` before `w2`.
    pub fn new_with_rng<R: Rng + ?Sized>(
        shape: NetworkShape,
        input: Matrix,
        target: Matrix,
        rng: &mut R,
    ) -> Result<Self> {
        shape.validate()?;
        shape.check_board(&input, "input")?;
        shape.check_board(&target, "target")?;

        let w1 = Matrix::random_with_rng(shape.cols, shape.hidden, rng);
        let w2 = Matrix::random_with_rng(shape.hidden, shape.cols, rng);

        Ok(Self {
            shape,
            input,
            target,
            w1,
            w2,
            hidden: None,
            output: Matrix::zeros(shape.rows, shape.cols),
            age: 0,
        })
    }

    /// A fresh network on a new sample that shares nothing with `self` but
    /// copies of its weights and its age.
    ///
    /// The hidden layer is not carried over and the output starts at zero; both
    /// are recomputed by the first [`Network::feedforward`].
    pub fn evaluation_clone(&self, input: Matrix, target: Matrix) -> Result<Self> {
        self.shape.check_board(&input, "input")?;
        self.shape.check_board(&target, "target")?;

        Ok(Self {
            shape: self.shape,
            input,
            target,
            w1: self.w1.clone(),
            w2: self.w2.clone(),
            hidden: None,
            output: Matrix::zeros(self.shape.rows, self.shape.cols),
            age: self.age,
        })
    }

    /// Swap in a new input/target pair. Weights, cached layers and age are kept.
    pub fn set_sample(&mut self, input: Matrix, target: Matrix) -> Result<()> {
        self.shape.check_board(&input, "input")?;
        self.shape.check_board(&target, "target")?;
        self.input = input;
        self.target = target;
        Ok(())
    }

    #[inline]
    pub fn shape(&self) -> NetworkShape {
        self.shape
    }

    #[inline]
    pub fn input(&self) -> &Matrix {
        &self.input
    }

    #[inline]
    pub fn target(&self) -> &Matrix {
        &self.target
    }

    /// Output of the most recent feedforward (zeros before the first one).
    #[inline]
    pub fn output(&self) -> &Matrix {
        &self.output
    }

    #[inline]
    pub fn hidden(&self) -> Option<&Matrix> {
        self.hidden.as_ref()
    }

    #[inline]
    pub fn weights1(&self) -> &Matrix {
        &self.w1
    }

    #[inline]
    pub fn weights2(&self) -> &Matrix {
        &self.w2
    }

    /// Number of completed [`Network::train`] steps.
    #[inline]
    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn feedforward(&mut self) -> Result<()> {
        let hidden = self.input.matmul(&self.w1)?.sigmoid();
        let output = hidden.matmul(&self.w2)?.sigmoid();
        self.hidden = Some(hidden);
        self.output = output;
        Ok(())
    }

    /// One update from the cached activations of the last feedforward.
    ///
    /// The error signal is `2 * (target - output)` and the resulting gradients are
    /// *added* to the weights as-is: there is no learning rate.
    pub fn backprop(&mut self) -> Result<()> {
        let hidden = self.hidden.as_ref().ok_or_else(|| {
            Error::InvalidData("backprop called before feedforward".to_owned())
        })?;

        let mut loss = self.target.sub(&self.output)?;
        loss.double_in_place();
        let delta2 = loss.hadamard(&self.output.sigmoid_derivative())?;

        let d_w2 = hidden.transpose().matmul(&delta2)?;

        // w2 is read before it is updated.
        let delta1 = delta2
            .matmul(&self.w2.transpose())?
            .hadamard(&hidden.sigmoid_derivative())?;
        let d_w1 = self.input.transpose().matmul(&delta1)?;

        self.w1.add_assign(&d_w1)?;
        self.w2.add_assign(&d_w2)?;
        Ok(())
    }

    /// `feedforward`, `backprop`, then `age += 1`.
    pub fn train(&mut self) -> Result<()> {
        self.feedforward()?;
        self.backprop()?;
        self.age += 1;
        Ok(())
    }

    /// Printable view of the current sample, output and age.
    pub fn summary(&self) -> Summary<'_> {
        Summary { network: self }
    }
}

/// See [`Network::summary`].
pub struct Summary<'a> {
    network: &'a Network,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nn = self.network;
        writeln!(f, "input:\n{}", nn.input)?;
        writeln!(f, "target:\n{}", nn.target)?;
        writeln!(f, "output:\n{}", nn.output)?;
        write!(f, "age: {}", nn.age)
    }
}
