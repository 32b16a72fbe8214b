//! Matrix module: row-major dense storage.

pub mod dense;
pub use dense::DenseMatrix;
