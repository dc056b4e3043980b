// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use log::*;
#[cfg(feature = "python")]
use pyo3::prelude::*;

use rayon::{current_num_threads, ThreadPoolBuilder};

use crate::errors::{FMError, Result};

/// Configure the global thread pool used for prediction and evaluation.
///
/// Fails if the pool has already been initialized.
pub fn init_thread_pool(n_threads: usize) -> Result<()> {
    debug!(
        "initializing accelerator thread pool with {} threads",
        n_threads
    );
    ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
        .map_err(|e| FMError::Config(format!("thread pool initialization failed: {}", e)))
}

/// Number of threads in the current pool.
pub fn thread_count() -> usize {
    current_num_threads()
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "init_accel_pool")]
pub fn py_init_accel_pool(n_threads: usize) -> PyResult<()> {
    Ok(init_thread_pool(n_threads)?)
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "thread_count")]
pub fn py_thread_count() -> PyResult<usize> {
    Ok(thread_count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_count_positive() {
        assert!(thread_count() >= 1);
    }

    #[test]
    fn test_second_init_fails() {
        // the global pool may already exist from another test; either way a
        // second initialization must be refused
        let _ = init_thread_pool(2);
        assert!(matches!(init_thread_pool(2), Err(FMError::Config(_))));
    }
}
