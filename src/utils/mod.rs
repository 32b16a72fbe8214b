//! Solver utilities: stopping criteria and index partitioning.

pub mod convergence;
pub mod partition;

pub use convergence::{Convergence, SolveStats, StopReason};
pub use partition::PartitionPlan;
