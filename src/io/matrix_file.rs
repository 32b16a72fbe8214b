//! Binary matrix files.
//!
//! Layout: two little-endian `u64` values (rows, cols), followed by
//! `rows * cols` little-endian IEEE-754 doubles in row-major order, with no
//! padding. Vectors are stored as single-column matrices.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{CgError, Result};
use crate::matrix::DenseMatrix;

const HEADER_LEN: u64 = 16;

/// Payload size in bytes announced by a header, if it is addressable at all.
fn payload_len(rows: u64, cols: u64) -> Option<(usize, usize, usize)> {
    let nrows = usize::try_from(rows).ok()?;
    let ncols = usize::try_from(cols).ok()?;
    let bytes = nrows.checked_mul(ncols)?.checked_mul(8)?;
    Some((nrows, ncols, bytes))
}

/// Read a matrix from any byte stream.
///
/// Nothing is allocated from the header alone: a stream shorter than the
/// header announces is an `UnexpectedEof` I/O error.
pub fn read_matrix<R: Read>(mut reader: R) -> Result<DenseMatrix> {
    let rows = reader.read_u64::<LittleEndian>()?;
    let cols = reader.read_u64::<LittleEndian>()?;
    read_payload(reader, rows, cols)
}

fn read_payload<R: Read>(reader: R, rows: u64, cols: u64) -> Result<DenseMatrix> {
    let (nrows, ncols, bytes) =
        payload_len(rows, cols).ok_or(CgError::MalformedHeader { rows, cols })?;

    let mut payload = Vec::new();
    reader.take(bytes as u64).read_to_end(&mut payload)?;
    if payload.len() != bytes {
        return Err(io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("matrix payload truncated: expected {bytes} bytes, found {}", payload.len()),
        )
        .into());
    }
    let mut data = vec![0.0; nrows * ncols];
    LittleEndian::read_f64_into(&payload, &mut data);
    DenseMatrix::from_row_major(nrows, ncols, data)
}

pub fn write_matrix<W: Write>(mut writer: W, m: &DenseMatrix) -> Result<()> {
    writer.write_u64::<LittleEndian>(m.nrows() as u64)?;
    writer.write_u64::<LittleEndian>(m.ncols() as u64)?;
    for &v in m.as_slice() {
        writer.write_f64::<LittleEndian>(v)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a matrix file, rejecting headers that announce more data than the
/// file holds.
pub fn read_matrix_file<P: AsRef<Path>>(path: P) -> Result<DenseMatrix> {
    let mut reader = BufReader::new(File::open(path)?);
    let available = reader.get_ref().metadata()?.len().saturating_sub(HEADER_LEN);
    let rows = reader.read_u64::<LittleEndian>()?;
    let cols = reader.read_u64::<LittleEndian>()?;
    match payload_len(rows, cols) {
        Some((_, _, bytes)) if bytes as u64 <= available => read_payload(reader, rows, cols),
        _ => Err(CgError::MalformedHeader { rows, cols }),
    }
}

pub fn write_matrix_file<P: AsRef<Path>>(path: P, m: &DenseMatrix) -> Result<()> {
    write_matrix(BufWriter::new(File::create(path)?), m)
}

/// Write `v` as an N×1 matrix.
pub fn write_vector_file<P: AsRef<Path>>(path: P, v: &[f64]) -> Result<()> {
    write_matrix_file(path, &DenseMatrix::column(v.to_vec()))
}
