// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Utilities for working with Arrow data.
mod lists;
mod rows;

pub use lists::extract_large_list;

use std::fmt::Display;

use arrow::array::downcast_array;
use arrow::array::Array;
use arrow::array::ArrowPrimitiveType;
use arrow::array::PrimitiveArray;
use arrow_schema::ArrowError;

use crate::errors::{FMError, Result};

fn type_error(name: &str, actual: impl Display, expected: impl Display) -> FMError {
    FMError::Arrow(ArrowError::InvalidArgumentError(format!(
        "invalid {} type {}, expected {}",
        name, actual, expected
    )))
}

pub fn checked_array_ref<'array, T: Array + 'static>(
    name: &str,
    tstr: &str,
    array: &'array dyn Array,
) -> Result<&'array T> {
    array
        .as_any()
        .downcast_ref()
        .ok_or_else(|| type_error(name, array.data_type(), tstr))
}

pub fn checked_array<E: ArrowPrimitiveType + 'static>(
    name: &str,
    array: &dyn Array,
) -> Result<PrimitiveArray<E>> {
    if array.data_type().equals_datatype(&E::DATA_TYPE) {
        Ok(downcast_array(array))
    } else {
        Err(type_error(name, array.data_type(), E::DATA_TYPE))
    }
}

/// Reject arrays with null entries.
pub fn require_valid(name: &str, array: &dyn Array) -> Result<()> {
    if array.null_count() > 0 {
        Err(FMError::Arrow(ArrowError::InvalidArgumentError(format!(
            "{} has {} null entries",
            name,
            array.null_count()
        ))))
    } else {
        Ok(())
    }
}
