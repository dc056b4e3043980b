// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Sparse training data.
//!
//! A [DMatrix] holds one batch of examples: the whole data set for in-memory
//! training, or the current working set when streaming from disk.
//!
//! ```
//! use _accel::data::DMatrix;
//!
//! let mut matrix = DMatrix::new();
//! matrix.reset(2);
//! matrix.labels[0] = 1.0;
//! matrix.add_node(0, 3, 0.5, 1).unwrap();
//! matrix.add_node(1, 7, 1.0, 0).unwrap();
//! assert_eq!(matrix.len(), 2);
//! ```

mod binary;

use crate::errors::{FMError, Result};

/// One feature entry in a sparse row.
///
/// Linear and FM models ignore the field; FFM uses it to pick latent vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Node {
    /// Field id, starting from 0.
    pub field_id: u32,
    /// Feature id, starting from 0 (the bias term).
    pub feat_id: u32,
    /// Numeric or categorical (1.0) feature value.
    pub feat_val: f32,
}

impl Node {
    pub fn new(field_id: u32, feat_id: u32, feat_val: f32) -> Node {
        Node {
            field_id,
            feat_id,
            feat_val,
        }
    }
}

/// One example's nonzero features.
pub type SparseRow = Vec<Node>;

/// A batch of sparse rows with their targets.
///
/// Labels are `0` or `-1` for negative and `+1` for positive examples, and
/// arbitrary reals for regression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DMatrix {
    pub rows: Vec<SparseRow>,
    pub labels: Vec<f32>,
}

impl DMatrix {
    /// Create an empty matrix.
    pub fn new() -> DMatrix {
        DMatrix::default()
    }

    /// Build a matrix from rows and labels, checking their lengths agree.
    pub fn from_parts(rows: Vec<SparseRow>, labels: Vec<f32>) -> Result<DMatrix> {
        if rows.len() != labels.len() {
            return Err(FMError::Precondition(format!(
                "matrix has {} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if rows.len() > u32::MAX as usize {
            return Err(FMError::Precondition(format!(
                "{} rows exceed the 32-bit row count",
                rows.len()
            )));
        }
        Ok(DMatrix { rows, labels })
    }

    /// Drop all contents and allocate `n` empty rows with zero labels.
    pub fn reset(&mut self, n: usize) {
        self.release();
        self.rows = vec![SparseRow::new(); n];
        self.labels = vec![0.0; n];
    }

    /// Drop all contents, giving the memory back.
    pub fn release(&mut self) {
        self.rows = Vec::new();
        self.labels = Vec::new();
    }

    /// Append a feature to a row.
    pub fn add_node(
        &mut self,
        row: usize,
        feat_id: u32,
        feat_val: f32,
        field_id: u32,
    ) -> Result<()> {
        let n = self.rows.len();
        let row = self.rows.get_mut(row).ok_or(FMError::OutOfRange {
            what: "row",
            index: row,
            limit: n,
        })?;
        row.push(Node::new(field_id, feat_id, feat_val));
        Ok(())
    }

    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the total number of stored features.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Iterate over `(row, label)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&SparseRow, f32)> + '_ {
        self.rows.iter().zip(self.labels.iter().copied())
    }

    /// Check that rows and labels agree in length.
    pub fn check(&self) -> Result<()> {
        if self.rows.len() != self.labels.len() {
            Err(FMError::Precondition(format!(
                "matrix has {} rows but {} labels",
                self.rows.len(),
                self.labels.len()
            )))
        } else {
            Ok(())
        }
    }
}
