//! Row-major dense matrix storage.
//!
//! `DenseMatrix` keeps the contiguous row-major layout the kernels and the
//! binary file format use, and converts to and from `faer::Mat` for reference
//! dense algebra.

use faer::Mat;

use crate::error::{CgError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct DenseMatrix {
    nrows: usize,
    ncols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// Wrap row-major storage; `data.len()` must equal `nrows * ncols`.
    pub fn from_row_major(nrows: usize, ncols: usize, data: Vec<f64>) -> Result<Self> {
        let expected = nrows * ncols;
        if data.len() != expected {
            return Err(CgError::DimensionMismatch {
                what: "row-major matrix data",
                expected,
                found: data.len(),
            });
        }
        Ok(Self { nrows, ncols, data })
    }

    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self { nrows, ncols, data: vec![0.0; nrows * ncols] }
    }

    pub fn identity(n: usize) -> Self {
        Self::from_diagonal(&vec![1.0; n])
    }

    pub fn from_diagonal(diag: &[f64]) -> Self {
        let n = diag.len();
        let mut m = Self::zeros(n, n);
        for (i, &d) in diag.iter().enumerate() {
            m.data[i * n + i] = d;
        }
        m
    }

    /// A single-column matrix holding `v`.
    pub fn column(v: Vec<f64>) -> Self {
        Self { nrows: v.len(), ncols: 1, data: v }
    }

    pub fn from_fn(nrows: usize, ncols: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let data = (0..nrows * ncols).map(|k| f(k / ncols, k % ncols)).collect();
        Self { nrows, ncols, data }
    }

    pub fn from_faer(m: &Mat<f64>) -> Self {
        Self::from_fn(m.nrows(), m.ncols(), |i, j| m[(i, j)])
    }

    pub fn to_faer(&self) -> Mat<f64> {
        Mat::from_fn(self.nrows, self.ncols, |i, j| self.data[i * self.ncols + j])
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.ncols..(i + 1) * self.ncols]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}
