//! Activation function.
//!
//! Both layers use a sigmoid with a temperature of 10: `1 / (1 + e^(-x / 10))`.
//! The flatter curve keeps the raw, un-normalised layer sums of an 8x8 board away
//! from saturation for longer.
//!
//! Like the rest of the crate, backprop works from the cached *post-activation*
//! value `y`, so the derivative is expressed as `y * (1 - y)`. The temperature is
//! intentionally not folded into the derivative.

/// Divisor applied to the pre-activation before the logistic function.
pub const SIGMOID_TEMPERATURE: f64 = 10.0;

/// Largest `f64` strictly below 1.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Temperature-scaled logistic function.
///
/// For finite `x` the result lies strictly inside `(0, 1)`: values that would round
/// to exactly 0 or 1 are pulled in to the nearest representable neighbour.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    let y = 1.0 / (1.0 + (-x / SIGMOID_TEMPERATURE).exp());
    y.clamp(f64::MIN_POSITIVE, BELOW_ONE)
}

/// Sigmoid derivative in terms of the cached output `y = sigmoid(x)`.
#[inline]
pub fn sigmoid_grad_from_output(y: f64) -> f64 {
    y * (1.0 - y)
}
