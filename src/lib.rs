//! parcg: distributed, multi-threaded Conjugate Gradient for dense SPD systems
//!
//! A group of participants (in-process threads via [`parallel::LocalComm`] or MPI
//! processes via `parallel::MpiComm`) each hold replicated copies of A, b and the
//! CG working vectors. The matrix-vector product is split into row bands and
//! reassembled with a gather; dot products reduce rank-local segments with a
//! sum; vector updates run redundantly on every participant. Within a
//! participant the kernels run on a fixed-size thread pool.

pub mod parallel;

pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod io;
pub mod matrix;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use crate::config::SolverOptions;
pub use crate::context::ParticipantContext;
pub use crate::core::{axpby, dot_local, gemv_band, InnerProduct, MatVec};
pub use crate::error::{CgError, Result};
pub use crate::matrix::DenseMatrix;
pub use crate::parallel::{run_participants, Comm, KernelPool, LocalComm, UniverseComm};
pub use crate::solver::{CgSolver, IterationSnapshot, LinearSolver};
pub use crate::utils::{Convergence, PartitionPlan, StopReason};

// Re-export SolveStats at the crate root for convenience
pub use crate::utils::convergence::SolveStats;
