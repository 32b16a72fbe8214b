//! MPI-based collective backend.
//!
//! This module provides an implementation of the `Comm` trait on top of the MPI
//! world communicator for distributed-memory runs: one participant per MPI
//! process, collectives mapped onto `MPI_Allreduce`, `MPI_Allgather` and
//! `MPI_Bcast`. The implementation is only available when the `mpi` feature is
//! enabled.
//!
//! # Example
//! ```no_run
//! use parcg::parallel::{Comm, MpiComm};
//! let comm = MpiComm::new().expect("MPI initialization");
//! println!("Rank: {} / {}", comm.rank(), comm.size());
//! comm.barrier();
//! ```

use mpi::collective::SystemOperation;
use mpi::environment::Universe;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

use crate::error::{CgError, Result};

/// MPI communicator wrapper for distributed parallelism.
///
/// Owns the MPI universe, so MPI is finalized when the `MpiComm` is dropped.
pub struct MpiComm {
    /// The MPI world communicator (all processes in the job).
    world: SimpleCommunicator,
    rank: usize,
    size: usize,
    // Declared last: dropped after the communicator.
    _universe: Universe,
}

impl MpiComm {
    /// Initializes MPI and wraps the world communicator.
    ///
    /// Fails if MPI was already initialized in this process.
    pub fn new() -> Result<Self> {
        let universe = mpi::initialize().ok_or(CgError::MpiInit)?;
        let world = universe.world();
        let rank = world.rank() as usize;
        let size = world.size() as usize;
        Ok(MpiComm { world, rank, size, _universe: universe })
    }
}

impl super::Comm for MpiComm {
    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.size
    }
    fn barrier(&self) {
        self.world.barrier();
    }

    fn all_sum(&self, local: f64) -> f64 {
        let mut global = 0.0f64;
        self.world.all_reduce_into(&local, &mut global, SystemOperation::sum());
        global
    }

    fn all_gather_segments(&self, local: &[f64], out: &mut [f64]) {
        assert_eq!(out.len(), local.len() * self.size, "gather output has incorrect length");
        self.world.all_gather_into(local, out);
    }

    /// Length first, so receivers can size their buffers, then the payload.
    fn broadcast(&self, buf: &mut Vec<f64>, root: usize) {
        let root_process = self.world.process_at_rank(root as i32);
        let mut len = buf.len() as u64;
        root_process.broadcast_into(&mut len);
        if self.rank != root {
            buf.clear();
            buf.resize(len as usize, 0.0);
        }
        root_process.broadcast_into(&mut buf[..]);
    }
}
