//! Configuration for solves and the command-line driver.

pub mod options;
pub use options::SolverOptions;
