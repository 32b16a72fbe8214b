//! Context module: per-participant identity and distributed kernels.
//!
//! Modules:
//! - [`participant`]: `ParticipantContext`, carrying the communicator and the
//!   kernel pool into the distributed dot product and matrix-vector product.

pub mod participant;
pub use participant::ParticipantContext;
