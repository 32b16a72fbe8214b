//! Serial reference implementations of the core traits.
//!
//! These back residual checks in the driver and in tests: a plain
//! single-threaded `y = A x` for [`DenseMatrix`] and a serial inner product
//! for `Vec<f64>`. The solver itself never calls them; it goes through the
//! threaded kernels and the collectives.

use crate::core::traits::{InnerProduct, MatVec};
use crate::matrix::DenseMatrix;

/// Computes `y = A * x` row by row.
impl MatVec<Vec<f64>> for DenseMatrix {
    fn matvec(&self, x: &Vec<f64>, y: &mut Vec<f64>) {
        assert_eq!(self.nrows(), y.len(), "Output vector y has incorrect length");
        assert_eq!(self.ncols(), x.len(), "Input vector x has incorrect length");
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = self.row(i).iter().zip(x).map(|(&a, &b)| a * b).sum();
        }
    }
}

impl InnerProduct<Vec<f64>> for () {
    type Scalar = f64;
    fn dot(&self, x: &Vec<f64>, y: &Vec<f64>) -> f64 {
        assert_eq!(x.len(), y.len(), "Vectors must have the same length");
        x.iter().zip(y).map(|(&xi, &yi)| xi * yi).sum()
    }
    fn norm(&self, x: &Vec<f64>) -> f64 {
        x.iter().map(|&xi| xi * xi).sum::<f64>().sqrt()
    }
}

/// ‖A x − b‖₂ / ‖b‖₂ computed serially; zero when `b` is zero and `x` solves it.
pub fn true_relative_residual(a: &DenseMatrix, x: &[f64], b: &[f64]) -> f64 {
    let ip = ();
    let mut ax = vec![0.0; a.nrows()];
    a.matvec(&x.to_vec(), &mut ax);
    let diff: Vec<f64> = ax.iter().zip(b).map(|(&l, &r)| l - r).collect();
    let b_norm = ip.norm(&b.to_vec());
    let d_norm = ip.norm(&diff);
    if b_norm == 0.0 { d_norm } else { d_norm / b_norm }
}
