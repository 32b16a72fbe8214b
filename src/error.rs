use thiserror::Error;

// Unified error type for parcg

pub type Result<T> = std::result::Result<T, CgError>;

#[derive(Error, Debug)]
pub enum CgError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed matrix header: {rows} x {cols} elements exceed the available data")]
    MalformedHeader { rows: u64, cols: u64 },
    #[error("matrix has to be square, got {rows} x {cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("{what}: expected length {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("length {len} is not a multiple of the participant count {parts}")]
    IndivisiblePartition { len: usize, parts: usize },
    #[error("failed to build kernel thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("invalid option {name} = {value:?}")]
    InvalidOption { name: &'static str, value: String },
    #[cfg(feature = "mpi")]
    #[error("MPI initialization failed (already initialized?)")]
    MpiInit,
}
