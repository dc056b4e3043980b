// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Binary matrix files for out-of-core batches.
//!
//! Layout, in host byte order:
//!
//! ```text
//! row_count: u32
//! row_count × { node_count: u32, node_count × (field_id: u32, feat_id: u32, feat_val: f32) }
//! label_count: u32
//! label_count × f32
//! ```
//!
//! Files are only portable between machines with the same byte order.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use log::*;

use super::{DMatrix, Node, SparseRow};
use crate::errors::{FMError, Result};

/// Counts read from a file are untrusted until the data behind them arrives.
const PREALLOC_LIMIT: usize = 1 << 16;

impl DMatrix {
    /// Write the matrix to a binary file.
    pub fn serialize<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.check()?;
        debug!(
            "writing {} rows ({} features) to {}",
            self.len(),
            self.nnz(),
            path.display()
        );
        let file = File::create(path).map_err(|e| FMError::io(path, e))?;
        let mut out = BufWriter::new(file);
        self.write_to(&mut out).map_err(|e| FMError::io(path, e))?;
        out.flush().map_err(|e| FMError::io(path, e))
    }

    /// Replace the matrix contents with those of a binary file.
    ///
    /// On failure the matrix is left empty.
    pub fn deserialize<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.release();
        let file = File::open(path).map_err(|e| FMError::io(path, e))?;
        let mut input = BufReader::new(file);
        let matrix = DMatrix::read_from(&mut input).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof | ErrorKind::InvalidData => FMError::Format {
                path: path.into(),
                msg: e.to_string(),
            },
            _ => FMError::io(path, e),
        })?;
        debug!("read {} rows from {}", matrix.len(), path.display());
        *self = matrix;
        Ok(())
    }

    /// Encode the matrix into a writer.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write_len(out, self.rows.len())?;
        for row in &self.rows {
            write_len(out, row.len())?;
            for node in row {
                out.write_all(&node.field_id.to_ne_bytes())?;
                out.write_all(&node.feat_id.to_ne_bytes())?;
                out.write_all(&node.feat_val.to_ne_bytes())?;
            }
        }
        write_len(out, self.labels.len())?;
        for y in &self.labels {
            out.write_all(&y.to_ne_bytes())?;
        }
        Ok(())
    }

    /// Decode a matrix from a reader.
    pub fn read_from<R: Read>(input: &mut R) -> io::Result<DMatrix> {
        let n_rows = read_u32(input)? as usize;
        let mut rows = Vec::with_capacity(n_rows.min(PREALLOC_LIMIT));
        for _ in 0..n_rows {
            let n_nodes = read_u32(input)? as usize;
            let mut row = SparseRow::with_capacity(n_nodes.min(PREALLOC_LIMIT));
            for _ in 0..n_nodes {
                let field_id = read_u32(input)?;
                let feat_id = read_u32(input)?;
                let feat_val = f32::from_ne_bytes(read_word(input)?);
                row.push(Node::new(field_id, feat_id, feat_val));
            }
            rows.push(row);
        }

        let n_labels = read_u32(input)? as usize;
        if n_labels != n_rows {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                format!("file has {} rows but {} labels", n_rows, n_labels),
            ));
        }
        let mut labels = Vec::with_capacity(n_labels.min(PREALLOC_LIMIT));
        for _ in 0..n_labels {
            labels.push(f32::from_ne_bytes(read_word(input)?));
        }

        Ok(DMatrix { rows, labels })
    }
}

fn write_len<W: Write>(out: &mut W, len: usize) -> io::Result<()> {
    let len: u32 = len.try_into().map_err(|_| {
        io::Error::new(
            ErrorKind::InvalidInput,
            format!("length {} does not fit in 32 bits", len),
        )
    })?;
    out.write_all(&len.to_ne_bytes())
}

fn read_word<R: Read>(input: &mut R) -> io::Result<[u8; 4]> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_u32<R: Read>(input: &mut R) -> io::Result<u32> {
    read_word(input).map(u32::from_ne_bytes)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use proptest::collection::vec as prop_vec;
    use proptest::prelude::*;
    use tempfile::tempdir;

    use super::*;

    fn sample_matrix() -> DMatrix {
        let mut matrix = DMatrix::new();
        matrix.reset(10);
        for i in 0..10 {
            matrix.labels[i] = if i % 2 == 0 { 1.0 } else { -1.0 };
            for j in 0..i {
                matrix
                    .add_node(i, j as u32, j as f32 * 0.5, (j % 3) as u32)
                    .unwrap();
            }
        }
        matrix
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");
        let matrix = sample_matrix();
        matrix.serialize(&path).unwrap();

        let mut loaded = DMatrix::new();
        loaded.deserialize(&path).unwrap();
        assert_eq!(loaded.len(), 10);
        assert_eq!(loaded, matrix);
    }

    #[test]
    fn test_layout() {
        let matrix = DMatrix::from_parts(vec![vec![Node::new(1, 2, 0.5)]], vec![1.0]).unwrap();
        let mut buf = Vec::new();
        matrix.write_to(&mut buf).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&1u32.to_ne_bytes());
        expected.extend_from_slice(&1u32.to_ne_bytes());
        expected.extend_from_slice(&1u32.to_ne_bytes());
        expected.extend_from_slice(&2u32.to_ne_bytes());
        expected.extend_from_slice(&0.5f32.to_ne_bytes());
        expected.extend_from_slice(&1u32.to_ne_bytes());
        expected.extend_from_slice(&1.0f32.to_ne_bytes());
        assert_eq!(buf, expected);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let mut matrix = sample_matrix();
        let err = matrix.deserialize(dir.path().join("absent.bin")).unwrap_err();
        assert!(matches!(err, FMError::Io { .. }));
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_truncated_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.bin");
        let mut buf = Vec::new();
        sample_matrix().write_to(&mut buf).unwrap();
        buf.truncate(buf.len() - 6);
        std::fs::write(&path, &buf).unwrap();

        let mut matrix = DMatrix::new();
        let err = matrix.deserialize(&path).unwrap_err();
        assert!(matches!(err, FMError::Format { .. }));
    }

    #[test]
    fn test_label_count_mismatch() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u32.to_ne_bytes());
        buf.extend_from_slice(&1u32.to_ne_bytes());
        buf.extend_from_slice(&1.0f32.to_ne_bytes());
        let err = DMatrix::read_from(&mut Cursor::new(buf)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    fn arb_row() -> impl Strategy<Value = SparseRow> {
        prop_vec(
            (0u32..64, 0u32..10_000, -1e3f32..1e3f32)
                .prop_map(|(field, feat, val)| Node::new(field, feat, val)),
            0..20,
        )
    }

    proptest! {
        #[test]
        fn prop_stream_round_trip(rows in prop_vec(arb_row(), 0..30), seed in any::<u64>()) {
            let labels: Vec<f32> = (0..rows.len())
                .map(|i| ((seed >> (i % 64)) & 1) as f32)
                .collect();
            let matrix = DMatrix::from_parts(rows, labels).unwrap();
            let mut buf = Vec::new();
            matrix.write_to(&mut buf).unwrap();
            let loaded = DMatrix::read_from(&mut Cursor::new(buf)).unwrap();
            prop_assert_eq!(loaded, matrix);
        }
    }
}
