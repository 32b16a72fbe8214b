//! File I/O for matrices and right-hand sides.

pub mod matrix_file;
pub use matrix_file::{
    read_matrix, read_matrix_file, write_matrix, write_matrix_file, write_vector_file,
};
