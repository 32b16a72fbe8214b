//! Core algebra: kernel primitives and serial reference traits.

pub mod kernels;
pub mod traits;
pub mod wrappers;

pub use kernels::{axpby, dot_local, gemv_band};
pub use traits::{InnerProduct, MatVec};
