//! Thread-parallel dense kernels over contiguous `f64` arrays.
//!
//! These are the three primitives of the CG iteration: a partial dot product
//! over an index segment, the in-place vector update `y ← αx + βy`, and a
//! row-band matrix-vector product on a row-major matrix. They know nothing
//! about ranks or communication; the distributed forms live in
//! [`crate::context::participant`].
//!
//! Inputs are trusted. Length mismatches are programming errors and panic.

use std::ops::Range;

use crate::parallel::KernelPool;

/// Σ x[i]·y[i] over `range`, split across the pool's threads.
pub fn dot_local(pool: &KernelPool, x: &[f64], y: &[f64], range: Range<usize>) -> f64 {
    assert!(range.end <= x.len() && range.end <= y.len(), "dot range out of bounds");
    pool.parallel_sum(range, |chunk| {
        x[chunk.clone()]
            .iter()
            .zip(&y[chunk])
            .map(|(&xi, &yi)| xi * yi)
            .sum()
    })
}

/// y ← α·x + β·y over the whole vector.
pub fn axpby(pool: &KernelPool, alpha: f64, x: &[f64], beta: f64, y: &mut [f64]) {
    assert_eq!(x.len(), y.len(), "Vectors must have the same length");
    pool.parallel_chunks_mut(y, |offset, y_chunk| {
        let x_chunk = &x[offset..offset + y_chunk.len()];
        for (yi, &xi) in y_chunk.iter_mut().zip(x_chunk) {
            *yi = alpha * xi + beta * *yi;
        }
    });
}

/// y[r] ← β·y[r] + α·Σ_c A[r, c]·x[c] for every row r in `rows`.
///
/// `a` is row-major with `x.len()` columns and `y.len()` rows. Only the band
/// `y[rows]` is written. With β = 0 the band is overwritten without being read.
pub fn gemv_band(
    pool: &KernelPool,
    alpha: f64,
    a: &[f64],
    x: &[f64],
    beta: f64,
    y: &mut [f64],
    rows: Range<usize>,
) {
    let ncols = x.len();
    assert_eq!(a.len(), y.len() * ncols, "Matrix shape does not match vectors");
    assert!(rows.end <= y.len(), "Row band out of bounds");
    let first_row = rows.start;
    pool.parallel_chunks_mut(&mut y[rows], |offset, y_chunk| {
        for (i, yi) in y_chunk.iter_mut().enumerate() {
            let r = first_row + offset + i;
            let row = &a[r * ncols..(r + 1) * ncols];
            let sum: f64 = row.iter().zip(x).map(|(&aij, &xj)| aij * xj).sum();
            *yi = if beta == 0.0 { alpha * sum } else { beta * *yi + alpha * sum };
        }
    });
}
