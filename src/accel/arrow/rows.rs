// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Build data matrices from Arrow arrays.

use arrow::{
    array::{Array, Float32Array, StructArray},
    datatypes::{DataType, Float32Type, Int32Type, UInt32Type},
};
use arrow_schema::ArrowError;
use log::*;

use super::{checked_array, checked_array_ref, extract_large_list, require_valid, type_error};
use crate::data::{DMatrix, Node};
use crate::errors::{FMError, Result};

/// Read an id column that may be signed or unsigned 32-bit.
fn id_column(name: &str, array: &dyn Array) -> Result<Vec<u32>> {
    require_valid(name, array)?;
    match array.data_type() {
        DataType::UInt32 => Ok(checked_array::<UInt32Type>(name, array)?.values().to_vec()),
        DataType::Int32 => checked_array::<Int32Type>(name, array)?
            .values()
            .iter()
            .map(|v| {
                u32::try_from(*v).map_err(|_| {
                    FMError::Arrow(ArrowError::InvalidArgumentError(format!(
                        "negative {} {}",
                        name, v
                    )))
                })
            })
            .collect(),
        dt => Err(type_error(name, dt, "Int32 or UInt32")),
    }
}

fn struct_column<'a>(entries: &'a StructArray, name: &str) -> Result<&'a dyn Array> {
    entries
        .column_by_name(name)
        .map(|c| c.as_ref())
        .ok_or_else(|| {
            FMError::Arrow(ArrowError::SchemaError(format!(
                "row entries have no {:?} column",
                name
            )))
        })
}

impl DMatrix {
    /// Build a matrix from an Arrow list of row entries and a label array.
    ///
    /// `rows` is a `List` or `LargeList` whose entries are structs with
    /// `field` and `index` (32-bit integer) and `value` (`Float32`) columns;
    /// `labels` is a `Float32` array with one label per row.
    pub fn from_arrow(rows: &dyn Array, labels: &dyn Array) -> Result<DMatrix> {
        let list = extract_large_list(rows)?;
        require_valid("row list", &list)?;
        let labels: Float32Array = checked_array::<Float32Type>("labels", labels)?;
        require_valid("labels", &labels)?;
        if labels.len() != list.len() {
            return Err(FMError::Precondition(format!(
                "{} rows but {} labels",
                list.len(),
                labels.len()
            )));
        }

        let entries: &StructArray =
            checked_array_ref("row entry", "Struct<field, index, value>", list.values().as_ref())?;
        let fields = id_column("field", struct_column(entries, "field")?)?;
        let feats = id_column("index", struct_column(entries, "index")?)?;
        let vals_col = struct_column(entries, "value")?;
        require_valid("value", vals_col)?;
        let vals = checked_array::<Float32Type>("value", vals_col)?;
        let vals = vals.values();

        let offsets = list.value_offsets();
        let mut out = Vec::with_capacity(list.len());
        for i in 0..list.len() {
            let start = offsets[i] as usize;
            let end = offsets[i + 1] as usize;
            let row = (start..end)
                .map(|j| Node::new(fields[j], feats[j], vals[j]))
                .collect();
            out.push(row);
        }

        let matrix = DMatrix::from_parts(out, labels.values().to_vec())?;
        debug!(
            "imported {} rows with {} entries from Arrow",
            matrix.len(),
            matrix.nnz()
        );
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Int32Array, LargeListArray, ListArray, UInt32Array};
    use arrow::buffer::OffsetBuffer;
    use arrow::datatypes::Field;

    use super::*;

    fn entries(fields: ArrayRef, index: ArrayRef, values: Vec<f32>) -> StructArray {
        let vals: ArrayRef = Arc::new(Float32Array::from(values));
        StructArray::from(vec![
            (
                Arc::new(Field::new("field", fields.data_type().clone(), false)),
                fields,
            ),
            (
                Arc::new(Field::new("index", index.data_type().clone(), false)),
                index,
            ),
            (Arc::new(Field::new("value", DataType::Float32, false)), vals),
        ])
    }

    fn list_of(entries: StructArray, lengths: &[usize]) -> ListArray {
        ListArray::try_new(
            Arc::new(Field::new("item", entries.data_type().clone(), false)),
            OffsetBuffer::<i32>::from_lengths(lengths.iter().copied()),
            Arc::new(entries),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_matches_node_construction() {
        let e = entries(
            Arc::new(UInt32Array::from(vec![0, 1, 2])),
            Arc::new(UInt32Array::from(vec![3, 5, 7])),
            vec![1.0, 0.5, 2.0],
        );
        let rows = list_of(e, &[2, 0, 1]);
        let labels = Float32Array::from(vec![1.0, 0.0, 1.0]);
        let matrix = DMatrix::from_arrow(&rows, &labels).unwrap();

        let mut expected = DMatrix::new();
        expected.reset(3);
        expected.add_node(0, 3, 1.0, 0).unwrap();
        expected.add_node(0, 5, 0.5, 1).unwrap();
        expected.add_node(2, 7, 2.0, 2).unwrap();
        expected.labels = vec![1.0, 0.0, 1.0];
        assert_eq!(matrix, expected);
    }

    #[test]
    fn test_large_list_signed_ids() {
        let e = entries(
            Arc::new(Int32Array::from(vec![0, 0])),
            Arc::new(Int32Array::from(vec![1, 2])),
            vec![1.0, 1.0],
        );
        let rows = LargeListArray::try_new(
            Arc::new(Field::new("item", e.data_type().clone(), false)),
            OffsetBuffer::<i64>::from_lengths([1, 1]),
            Arc::new(e),
            None,
        )
        .unwrap();
        let labels = Float32Array::from(vec![0.0, 1.0]);
        let matrix = DMatrix::from_arrow(&rows, &labels).unwrap();
        assert_eq!(matrix.rows[1], vec![Node::new(0, 2, 1.0)]);
    }

    #[test]
    fn test_negative_id_rejected() {
        let e = entries(
            Arc::new(Int32Array::from(vec![0])),
            Arc::new(Int32Array::from(vec![-4])),
            vec![1.0],
        );
        let rows = list_of(e, &[1]);
        let err = DMatrix::from_arrow(&rows, &Float32Array::from(vec![1.0])).unwrap_err();
        assert!(err.to_string().contains("negative index"));
    }

    #[test]
    fn test_label_mismatch_rejected() {
        let e = entries(
            Arc::new(UInt32Array::from(vec![0])),
            Arc::new(UInt32Array::from(vec![1])),
            vec![1.0],
        );
        let rows = list_of(e, &[1]);
        let res = DMatrix::from_arrow(&rows, &Float32Array::from(vec![1.0, 0.0]));
        assert!(matches!(res, Err(FMError::Precondition(_))));
    }

    #[test]
    fn test_wrong_types_rejected() {
        let e = entries(
            Arc::new(UInt32Array::from(vec![0])),
            Arc::new(UInt32Array::from(vec![1])),
            vec![1.0],
        );
        let rows = list_of(e, &[1]);
        // labels must be Float32
        let labels = Int32Array::from(vec![1]);
        assert!(matches!(
            DMatrix::from_arrow(&rows, &labels),
            Err(FMError::Arrow(_))
        ));
        // rows must be a list
        let flat = Float32Array::from(vec![1.0]);
        assert!(DMatrix::from_arrow(&flat, &flat).is_err());
    }

    #[test]
    fn test_missing_column_rejected() {
        let idx: ArrayRef = Arc::new(UInt32Array::from(vec![1]));
        let e = StructArray::from(vec![(
            Arc::new(Field::new("index", DataType::UInt32, false)),
            idx,
        )]);
        let rows = list_of(e, &[1]);
        let err = DMatrix::from_arrow(&rows, &Float32Array::from(vec![1.0])).unwrap_err();
        assert!(err.to_string().contains("\"field\""));
    }

    #[test]
    fn test_sliced_rows() {
        let e = entries(
            Arc::new(UInt32Array::from(vec![0, 0, 0])),
            Arc::new(UInt32Array::from(vec![1, 2, 3])),
            vec![1.0, 2.0, 3.0],
        );
        let rows = list_of(e, &[1, 2]).slice(1, 1);
        let matrix = DMatrix::from_arrow(&rows, &Float32Array::from(vec![1.0])).unwrap();
        assert_eq!(matrix.rows[0], vec![Node::new(0, 2, 2.0), Node::new(0, 3, 3.0)]);
    }
}
