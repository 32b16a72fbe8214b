//! Tests for the threaded kernels against the serial reference algebra:
//! row-band matrix-vector products, segment dot products and vector updates.

use approx::assert_abs_diff_eq;
use parcg::core::kernels::{axpby, dot_local, gemv_band};
use parcg::core::traits::{InnerProduct, MatVec};
use parcg::{DenseMatrix, KernelPool, PartitionPlan};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_vec(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.r#gen::<f64>() - 0.5).collect()
}

/// Bands computed independently and stitched together equal the full product,
/// for any thread count.
#[test]
fn banded_matvec_matches_serial() {
    let n = 13;
    let mut rng = StdRng::seed_from_u64(7);
    let vals = random_vec(&mut rng, n * n);
    let a = DenseMatrix::from_row_major(n, n, vals).unwrap();
    let x = random_vec(&mut rng, n);
    let mut expected = vec![0.0; n];
    a.matvec(&x, &mut expected);

    for threads in 1..=4 {
        let pool = KernelPool::new(threads).unwrap();
        for parts in 1..=3 {
            let mut y = vec![0.0; n];
            for rows in PartitionPlan::new(n, parts).ranges() {
                gemv_band(&pool, 1.0, a.as_slice(), &x, 0.0, &mut y, rows);
            }
            for i in 0..n {
                assert_abs_diff_eq!(y[i], expected[i], epsilon = 1e-12);
            }
        }
    }
}

/// Segment dots over a partition add up to the full inner product.
#[test]
fn segment_dots_sum_to_full_dot() {
    let n = 31;
    let mut rng = StdRng::seed_from_u64(11);
    let x = random_vec(&mut rng, n);
    let y = random_vec(&mut rng, n);
    let ip = ();
    let full = ip.dot(&x, &y);
    let pool = KernelPool::new(3).unwrap();
    let total: f64 = PartitionPlan::new(n, 4)
        .ranges()
        .map(|r| dot_local(&pool, &x, &y, r))
        .sum();
    assert_abs_diff_eq!(total, full, epsilon = 1e-12);
}

/// axpby agrees with the elementwise formula and leaves lengths alone.
#[test]
fn axpby_matches_formula() {
    let n = 17;
    let mut rng = StdRng::seed_from_u64(3);
    let x = random_vec(&mut rng, n);
    let y0 = random_vec(&mut rng, n);
    let mut y = y0.clone();
    axpby(&KernelPool::new(4).unwrap(), -0.75, &x, 2.0, &mut y);
    for i in 0..n {
        assert_abs_diff_eq!(y[i], -0.75 * x[i] + 2.0 * y0[i], epsilon = 1e-15);
    }
}

/// A fixed thread count gives bit-identical results across calls.
#[test]
fn kernels_are_deterministic_for_fixed_threads() {
    let n = 1000;
    let mut rng = StdRng::seed_from_u64(5);
    let x = random_vec(&mut rng, n);
    let y = random_vec(&mut rng, n);
    let pool = KernelPool::new(4).unwrap();
    let first = dot_local(&pool, &x, &y, 0..n);
    for _ in 0..10 {
        assert_eq!(dot_local(&pool, &x, &y, 0..n).to_bits(), first.to_bits());
    }
}

#[test]
fn dot_and_norm() {
    let x = vec![1.0, 2.0, 3.0];
    let y = vec![4.0, -5.0, 6.0];
    let ip = ();
    let dot = ip.dot(&x, &y);
    assert_abs_diff_eq!(dot, 1.0 * 4.0 + 2.0 * (-5.0) + 3.0 * 6.0, epsilon = 1e-12);
    let norm_x = ip.norm(&x);
    let expected_norm = ((1.0f64).powi(2) + 2.0f64.powi(2) + 3.0f64.powi(2)).sqrt();
    assert_abs_diff_eq!(norm_x, expected_norm, epsilon = 1e-12);
}
