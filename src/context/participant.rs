//! Participant identity and the distributed forms of the kernels.
//!
//! A `ParticipantContext` carries what a rank needs to take part in a
//! collective kernel: the communicator (rank, group size) and the local
//! kernel pool. The pure kernels in [`crate::core::kernels`] stay context-free.
//!
//! Two strategies meet here:
//! - **partition and reduce/gather**: the dot product sums a rank-local
//!   segment and reduces with `all_sum`; the matrix-vector product computes a
//!   row band and reassembles the vector with `all_gather_segments`.
//! - **replicate**: vector updates are done in full on every participant by
//!   the solver, with no communication.

use crate::core::kernels::{dot_local, gemv_band};
use crate::error::{CgError, Result};
use crate::matrix::DenseMatrix;
use crate::parallel::{Comm, KernelPool};
use crate::utils::partition::PartitionPlan;

pub struct ParticipantContext<'a, C: Comm> {
    comm: &'a C,
    pool: &'a KernelPool,
}

impl<'a, C: Comm> ParticipantContext<'a, C> {
    pub fn new(comm: &'a C, pool: &'a KernelPool) -> Self {
        Self { comm, pool }
    }

    pub fn pool(&self) -> &'a KernelPool {
        self.pool
    }

    pub fn rank(&self) -> usize {
        self.comm.rank()
    }

    pub fn size(&self) -> usize {
        self.comm.size()
    }

    pub fn is_root(&self) -> bool {
        self.comm.is_root()
    }

    /// Partition of `len` indices over the participants.
    pub fn plan(&self, len: usize) -> PartitionPlan {
        PartitionPlan::new(len, self.size())
    }

    /// The equal-segment gather needs `len` to be a multiple of the group size.
    pub fn check_gatherable(&self, len: usize) -> Result<PartitionPlan> {
        let plan = self.plan(len);
        if plan.is_uniform() {
            Ok(plan)
        } else {
            Err(CgError::IndivisiblePartition { len, parts: plan.parts() })
        }
    }

    /// Global ⟨x, y⟩: local segment dot, then `all_sum`. Collective.
    pub fn dot(&self, x: &[f64], y: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), y.len());
        let segment = self.plan(x.len()).range(self.rank());
        self.comm.all_sum(dot_local(self.pool, x, y, segment))
    }

    /// y ← A·x replicated on every participant. Collective.
    ///
    /// Each rank computes its row band into `y`, copies it into `band`, and
    /// the gather overwrites all of `y` with the concatenated bands. Requires
    /// `x.len()` to be a multiple of the group size and
    /// `band.len() == x.len() / size`.
    pub fn matvec(&self, a: &DenseMatrix, x: &[f64], y: &mut [f64], band: &mut [f64]) {
        let plan = self.plan(x.len());
        debug_assert!(plan.is_uniform());
        debug_assert_eq!(band.len(), plan.chunk());
        let rows = plan.range(self.rank());
        gemv_band(self.pool, 1.0, a.as_slice(), x, 0.0, y, rows.clone());
        band.copy_from_slice(&y[rows]);
        self.comm.all_gather_segments(band, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::{run_participants, LocalComm};

    #[test]
    fn distributed_dot_matches_serial() {
        let x: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..12).map(|i| 1.0 - i as f64 * 0.5).collect();
        let serial: f64 = x.iter().zip(&y).map(|(a, b)| a * b).sum();
        let dots = run_participants(3, |comm| {
            let pool = KernelPool::new(2).unwrap();
            ParticipantContext::new(&comm, &pool).dot(&x, &y)
        });
        for d in dots {
            assert!((d - serial).abs() < 1e-12);
        }
    }

    #[test]
    fn distributed_matvec_is_replicated() {
        let n = 8;
        let a = DenseMatrix::from_fn(n, n, |i, j| (i * n + j) as f64);
        let x: Vec<f64> = (0..n).map(|i| (i % 3) as f64 - 1.0).collect();
        let expected: Vec<f64> = (0..n)
            .map(|i| a.row(i).iter().zip(&x).map(|(p, q)| p * q).sum())
            .collect();
        let results = run_participants(4, |comm| {
            let pool = KernelPool::new(2).unwrap();
            let ctx = ParticipantContext::new(&comm, &pool);
            let mut y = vec![0.0; n];
            let mut band = vec![0.0; n / 4];
            ctx.matvec(&a, &x, &mut y, &mut band);
            y
        });
        for y in results {
            assert_eq!(y, expected);
        }
    }

    #[test]
    fn indivisible_length_is_reported() {
        let comms = LocalComm::group(2);
        let pool = KernelPool::new(1).unwrap();
        let ctx = ParticipantContext::new(&comms[0], &pool);
        assert!(matches!(
            ctx.check_gatherable(5),
            Err(CgError::IndivisiblePartition { len: 5, parts: 2 })
        ));
        assert_eq!(ctx.check_gatherable(6).unwrap().chunk(), 3);
    }
}
