// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Arrow list support code.

use arrow::{
    array::{Array, LargeListArray, ListArray},
    buffer::{OffsetBuffer, ScalarBuffer},
};

use log::*;

use super::type_error;
use crate::errors::Result;

/// Get a list array as a large list array, widening 32-bit offsets.
pub fn extract_large_list(array: &dyn Array) -> Result<LargeListArray> {
    let any = array.as_any();
    if let Some(arr) = any.downcast_ref::<LargeListArray>() {
        Ok(arr.clone())
    } else if let Some(arr) = any.downcast_ref::<ListArray>() {
        debug!("converting type {}", arr.data_type());
        let (field, offsets, values, nulls) = arr.clone().into_parts();
        let offsets: Vec<_> = offsets.iter().map(|o| *o as i64).collect();
        let offsets = OffsetBuffer::new(ScalarBuffer::from(offsets));
        Ok(LargeListArray::try_new(field, offsets, values, nulls)?)
    } else {
        Err(type_error("row list", array.data_type(), "List or LargeList"))
    }
}
