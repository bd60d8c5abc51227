//! Dense row-major matrices.
//!
//! Everything the network touches (boards turned into tensors, weights, layer
//! activations) is a `Matrix` of `f64`. Operations that combine two matrices are
//! shape-checked and return [`Error::InvalidShape`] instead of producing garbage.

use std::fmt;

use rand::Rng;
use rand::distributions::{Distribution, Uniform};

use crate::activation;
use crate::matmul::gemm_f64;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    /// Row-major, `rows * cols` values.
    data: Vec<f64>,
}

impl Matrix {
    /// A `rows x cols` matrix of zeros.
    ///
    /// Panics if either dimension is zero.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// A `rows x cols` matrix with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        assert!(rows > 0 && cols > 0, "matrix dims must be > 0");
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// A `rows x cols` matrix with every cell drawn independently from `U[0, 1)`.
    pub fn random_with_rng<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        assert!(rows > 0 && cols > 0, "matrix dims must be > 0");
        let dist = Uniform::new(0.0_f64, 1.0_f64);
        let data = (0..rows * cols).map(|_| dist.sample(rng)).collect();
        Self { rows, cols, data }
    }

    /// Build from per-row vectors. Rows must be non-empty and of equal length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err(Error::InvalidData("matrix must not be empty".to_owned()));
        }

        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::InvalidShape(format!(
                    "row {i} has len {}, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Build from a flat row-major buffer.
    pub fn from_flat(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidData(format!(
                "matrix dims must be > 0, got {rows}x{cols}"
            )));
        }
        if data.len() != rows * cols {
            return Err(Error::InvalidShape(format!(
                "buffer len {} does not match {rows}x{cols}",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Panics if `(row, col)` is out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        self.data[row * self.cols + col]
    }

    /// Panics if `(row, col)` is out of bounds.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        self.data[row * self.cols + col] = value;
    }

    /// Iterate over the rows as slices.
    pub fn row_iter(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.cols)
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    fn ensure_same_shape(&self, other: &Matrix, op: &str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::InvalidShape(format!(
                "{op}: {}x{} vs {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        Ok(())
    }

    /// Elementwise temperature sigmoid, see [`activation::sigmoid`].
    pub fn sigmoid(&self) -> Self {
        self.map(activation::sigmoid)
    }

    /// Elementwise `x * (1 - x)`.
    ///
    /// Only meaningful on matrices that already went through [`Matrix::sigmoid`].
    pub fn sigmoid_derivative(&self) -> Self {
        self.map(activation::sigmoid_grad_from_output)
    }

    /// Doubles every element in place and hands the matrix back for chaining.
    pub fn double_in_place(&mut self) -> &mut Self {
        for x in &mut self.data {
            *x *= 2.0;
        }
        self
    }

    /// Hadamard (elementwise) product.
    pub fn hadamard(&self, other: &Matrix) -> Result<Self> {
        self.ensure_same_shape(other, "hadamard")?;
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a * b)
            .collect();
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// `self - other`.
    pub fn sub(&self, other: &Matrix) -> Result<Self> {
        self.ensure_same_shape(other, "sub")?;
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a - b)
            .collect();
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// `self += other`.
    pub fn add_assign(&mut self, other: &Matrix) -> Result<()> {
        self.ensure_same_shape(other, "add")?;
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
        Ok(())
    }

    /// Matrix product `self * other`.
    pub fn matmul(&self, other: &Matrix) -> Result<Self> {
        if self.cols != other.rows {
            return Err(Error::InvalidShape(format!(
                "matmul: {}x{} * {}x{} (inner dims differ)",
                self.rows, self.cols, other.rows, other.cols
            )));
        }

        let mut out = Self::zeros(self.rows, other.cols);
        gemm_f64(
            self.rows,
            other.cols,
            self.cols,
            1.0,
            &self.data,
            self.cols,
            1,
            &other.data,
            other.cols,
            1,
            0.0,
            &mut out.data,
            out.cols,
            1,
        );
        Ok(out)
    }

    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.data[c * self.rows + r] = self.data[r * self.cols + c];
            }
        }
        out
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.row_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, x) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{x:.2}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn m(rows: &[&[f64]]) -> Matrix {
        let rows: Vec<Vec<f64>> = rows.iter().map(|r| r.to_vec()).collect();
        Matrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn zeros_has_requested_shape() {
        let z = Matrix::zeros(3, 5);
        assert_eq!(z.shape(), (3, 5));
        assert!(z.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn random_values_are_in_unit_interval_and_seeded() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = Matrix::random_with_rng(4, 6, &mut rng);
        assert_eq!(a.shape(), (4, 6));
        assert!(a.as_slice().iter().all(|&x| (0.0..1.0).contains(&x)));

        let mut rng = StdRng::seed_from_u64(7);
        let b = Matrix::random_with_rng(4, 6, &mut rng);
        assert_eq!(a, b);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, Error::InvalidShape(_)));
        assert!(Matrix::from_rows(&[]).is_err());
    }

    #[test]
    fn sigmoid_is_strictly_between_zero_and_one() {
        let x = m(&[&[-1e9, -50.0, 0.0], &[3.0, 50.0, 1e9]]);
        let y = x.sigmoid();
        assert!(y.as_slice().iter().all(|&v| v > 0.0 && v < 1.0));
        assert!((y.get(0, 2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sigmoid_derivative_uses_output_form() {
        let y = m(&[&[0.5, 0.2]]);
        let d = y.sigmoid_derivative();
        assert!((d.get(0, 0) - 0.25).abs() < 1e-12);
        assert!((d.get(0, 1) - 0.16).abs() < 1e-12);
    }

    #[test]
    fn double_in_place_mutates_and_returns_self() {
        let mut a = m(&[&[1.0, -2.5]]);
        let doubled = a.double_in_place().clone();
        assert_eq!(doubled, m(&[&[2.0, -5.0]]));
        assert_eq!(a, doubled);
    }

    #[test]
    fn hadamard_multiplies_elementwise() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let b = m(&[&[2.0, 0.5], &[-1.0, 0.0]]);
        assert_eq!(a.hadamard(&b).unwrap(), m(&[&[2.0, 1.0], &[-3.0, 0.0]]));
    }

    #[test]
    fn hadamard_rejects_shape_mismatch() {
        let a = Matrix::zeros(2, 2);
        let b = Matrix::zeros(2, 3);
        assert!(matches!(a.hadamard(&b), Err(Error::InvalidShape(_))));
    }

    #[test]
    fn matmul_and_transpose() {
        let a = m(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let b = m(&[&[1.0], &[0.0], &[-1.0]]);
        assert_eq!(a.matmul(&b).unwrap(), m(&[&[-2.0], &[-2.0]]));

        let t = a.transpose();
        assert_eq!(t, m(&[&[1.0, 4.0], &[2.0, 5.0], &[3.0, 6.0]]));
        assert!(matches!(a.matmul(&a), Err(Error::InvalidShape(_))));
    }

    #[test]
    fn display_uses_two_decimals() {
        let a = m(&[&[0.126, 1.0], &[0.5, 0.333]]);
        assert_eq!(a.to_string(), "0.13, 1.00\n0.50, 0.33");
    }
}
