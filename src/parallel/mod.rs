//! Parallel execution: collectives across participants and the kernel thread pool.
//!
//! Participants form a flat group with ranks `0..size`. Every collective is
//! blocking: no participant returns until all of them have entered with
//! matching arguments.

pub trait Comm {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;
    fn barrier(&self);
    /// Sum `local` over all participants; every participant receives the same value.
    fn all_sum(&self, local: f64) -> f64;
    /// Concatenate equal-sized segments in rank order into `out` on every participant.
    /// `out.len()` must be `size() * local.len()`.
    fn all_gather_segments(&self, local: &[f64], out: &mut [f64]);
    /// Replace `buf` on every participant with the contents of `buf` on `root`.
    fn broadcast(&self, buf: &mut Vec<f64>, root: usize);
    fn is_root(&self) -> bool {
        self.rank() == 0
    }
}

pub mod local_comm;
pub use local_comm::{run_participants, LocalComm};

pub mod pool;
pub use pool::KernelPool;

#[cfg(feature = "mpi")]
pub mod mpi_comm;
#[cfg(feature = "mpi")]
pub use mpi_comm::MpiComm;

/// Runtime choice of collective backend.
pub enum UniverseComm {
    Local(LocalComm),
    #[cfg(feature = "mpi")]
    Mpi(MpiComm),
}

impl Comm for UniverseComm {
    fn rank(&self) -> usize {
        match self {
            UniverseComm::Local(comm) => comm.rank(),
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.rank(),
        }
    }
    fn size(&self) -> usize {
        match self {
            UniverseComm::Local(comm) => comm.size(),
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.size(),
        }
    }
    fn barrier(&self) {
        match self {
            UniverseComm::Local(comm) => comm.barrier(),
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.barrier(),
        }
    }
    fn all_sum(&self, local: f64) -> f64 {
        match self {
            UniverseComm::Local(comm) => comm.all_sum(local),
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.all_sum(local),
        }
    }
    fn all_gather_segments(&self, local: &[f64], out: &mut [f64]) {
        match self {
            UniverseComm::Local(comm) => comm.all_gather_segments(local, out),
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.all_gather_segments(local, out),
        }
    }
    fn broadcast(&self, buf: &mut Vec<f64>, root: usize) {
        match self {
            UniverseComm::Local(comm) => comm.broadcast(buf, root),
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.broadcast(buf, root),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_forwards_to_local_group() {
        let results = run_participants(3, |comm| {
            let comm = UniverseComm::Local(comm);
            let mut seg = vec![0.0; 6];
            comm.all_gather_segments(&[comm.rank() as f64; 2], &mut seg);
            (comm.rank(), comm.size(), comm.all_sum(comm.rank() as f64 + 1.0), seg)
        });
        for (rank, (r, size, sum, seg)) in results.into_iter().enumerate() {
            assert_eq!((r, size, sum), (rank, 3, 6.0));
            assert_eq!(seg, vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
        }
    }
}
