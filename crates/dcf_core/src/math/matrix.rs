//! Dense sample × period matrix.
//!
//! # Memory Layout
//!
//! Values are stored row-major in one contiguous buffer: row `i` holds
//! sample `i`, column `t` holds period `t + 1`. Every operation that
//! combines two matrices checks shapes first and fails with
//! [`ConfigError::ShapeMismatch`] instead of broadcasting.

use serde::{Deserialize, Serialize};

use crate::types::ConfigError;

/// Simulated values of one quantity per sample (row) and period (column).
///
/// # Examples
///
/// ```rust
/// use dcf_core::math::DriverMatrix;
///
/// let revenue = DriverMatrix::from_fn(2, 3, |_, t| 100.0 * (t + 1) as f64);
/// let margin = DriverMatrix::from_fn(2, 3, |_, _| 0.5);
///
/// let gross_profit = revenue.mul(&margin).unwrap();
/// assert_eq!(gross_profit.row(1), &[50.0, 100.0, 150.0]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriverMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DriverMatrix {
    /// Creates a matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a matrix from a function of `(row, col)`.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(row, col));
            }
        }
        Self { rows, cols, data }
    }

    /// Wraps a row-major buffer.
    ///
    /// # Errors
    ///
    /// `ConfigError::LengthMismatch` if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, ConfigError> {
        if data.len() != rows * cols {
            return Err(ConfigError::LengthMismatch {
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Concatenates blocks along the sample axis, preserving block order.
    ///
    /// # Errors
    ///
    /// `ConfigError::ShapeMismatch` if any block does not have `cols`
    /// columns.
    pub fn vstack<'a, I>(blocks: I, cols: usize) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = &'a DriverMatrix>,
    {
        let mut rows = 0;
        let mut data = Vec::new();
        for block in blocks {
            if block.cols != cols {
                return Err(ConfigError::ShapeMismatch {
                    expected: (block.rows, cols),
                    actual: block.shape(),
                });
            }
            rows += block.rows;
            data.extend_from_slice(&block.data);
        }
        Ok(Self { rows, cols, data })
    }

    /// Returns `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of samples.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of periods.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the value at `(row, col)`, or `None` out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Returns one sample's trajectory.
    ///
    /// # Panics
    ///
    /// Panics if `row >= rows`.
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Iterates over rows.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        // chunks_exact(0) panics; a zero-column matrix has no data anyway.
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    /// Copies one period across all samples.
    ///
    /// # Panics
    ///
    /// Panics if `col >= cols`.
    pub fn column(&self, col: usize) -> Vec<f64> {
        assert!(col < self.cols, "column {} out of range {}", col, self.cols);
        (0..self.rows)
            .map(|row| self.data[row * self.cols + col])
            .collect()
    }

    /// Copies the final period across all samples.
    ///
    /// Returns an empty vector for a matrix without columns.
    pub fn last_column(&self) -> Vec<f64> {
        match self.cols {
            0 => Vec::new(),
            cols => self.column(cols - 1),
        }
    }

    /// Returns the row-major buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Consumes the matrix, returning the row-major buffer.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    fn check_shape(&self, other: &DriverMatrix) -> Result<(), ConfigError> {
        if self.shape() != other.shape() {
            return Err(ConfigError::ShapeMismatch {
                expected: self.shape(),
                actual: other.shape(),
            });
        }
        Ok(())
    }

    /// Combines two identically shaped matrices element by element.
    ///
    /// # Errors
    ///
    /// `ConfigError::ShapeMismatch` if the shapes differ.
    pub fn zip_with<F>(&self, other: &DriverMatrix, f: F) -> Result<Self, ConfigError>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_shape(other)?;
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// Element-wise sum.
    pub fn add(&self, other: &DriverMatrix) -> Result<Self, ConfigError> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Element-wise difference.
    pub fn sub(&self, other: &DriverMatrix) -> Result<Self, ConfigError> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Element-wise product.
    pub fn mul(&self, other: &DriverMatrix) -> Result<Self, ConfigError> {
        self.zip_with(other, |a, b| a * b)
    }

    /// Element-wise quotient.
    pub fn div(&self, other: &DriverMatrix) -> Result<Self, ConfigError> {
        self.zip_with(other, |a, b| a / b)
    }

    /// Applies `f` to every element.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Multiplies every element by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }

    /// Sum over periods for each sample.
    pub fn row_sums(&self) -> Vec<f64> {
        self.iter_rows().map(|row| row.iter().sum()).collect()
    }

    /// Mean over samples for each period.
    ///
    /// Returns NaN per column for a matrix without rows.
    pub fn column_means(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.cols];
        for row in self.iter_rows() {
            for (sum, &value) in sums.iter_mut().zip(row) {
                *sum += value;
            }
        }
        let n = self.rows as f64;
        sums.into_iter().map(|s| s / n).collect()
    }

    /// Returns `true` if every element is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DriverMatrix {
        DriverMatrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap()
    }

    #[test]
    fn test_shape_and_access() {
        let m = sample();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.get(1, 2), Some(6.0));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(m.column(1), vec![2.0, 5.0]);
        assert_eq!(m.last_column(), vec![3.0, 6.0]);
    }

    #[test]
    fn test_from_vec_length_checked() {
        let err = DriverMatrix::from_vec(2, 2, vec![1.0; 3]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::LengthMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_elementwise_ops() {
        let a = sample();
        let b = DriverMatrix::from_fn(2, 3, |_, _| 2.0);
        assert_eq!(a.add(&b).unwrap().row(0), &[3.0, 4.0, 5.0]);
        assert_eq!(a.sub(&b).unwrap().row(1), &[2.0, 3.0, 4.0]);
        assert_eq!(a.mul(&b).unwrap().row(1), &[8.0, 10.0, 12.0]);
        assert_eq!(a.div(&b).unwrap().row(0), &[0.5, 1.0, 1.5]);
        assert_eq!(a.scale(10.0).row(0), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let a = sample();
        let b = DriverMatrix::zeros(3, 2);
        assert_eq!(
            a.mul(&b).unwrap_err(),
            ConfigError::ShapeMismatch {
                expected: (2, 3),
                actual: (3, 2)
            }
        );
    }

    #[test]
    fn test_vstack_preserves_order() {
        let top = DriverMatrix::from_fn(1, 2, |_, _| 1.0);
        let empty = DriverMatrix::zeros(0, 2);
        let bottom = DriverMatrix::from_fn(2, 2, |r, _| 10.0 + r as f64);

        let stacked = DriverMatrix::vstack([&top, &empty, &bottom], 2).unwrap();
        assert_eq!(stacked.shape(), (3, 2));
        assert_eq!(stacked.row(0), &[1.0, 1.0]);
        assert_eq!(stacked.row(1), &[10.0, 10.0]);
        assert_eq!(stacked.row(2), &[11.0, 11.0]);
    }

    #[test]
    fn test_vstack_rejects_wrong_width() {
        let a = DriverMatrix::zeros(1, 2);
        let b = DriverMatrix::zeros(1, 3);
        assert!(matches!(
            DriverMatrix::vstack([&a, &b], 2),
            Err(ConfigError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_reductions() {
        let m = sample();
        assert_eq!(m.row_sums(), vec![6.0, 15.0]);
        assert_eq!(m.column_means(), vec![2.5, 3.5, 4.5]);
        assert!(m.is_finite());
        assert!(!m.map(|v| v / 0.0).is_finite());
    }
}
