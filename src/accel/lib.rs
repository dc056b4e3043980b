// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Scoring and gradient engine for linear models, factorization machines
//! and field-aware factorization machines over sparse data.

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod arrow;
pub mod config;
pub mod data;
pub mod errors;
pub mod loss;
pub mod metric;
pub mod model;
pub mod parallel;
pub mod predict;
pub mod progress;
pub mod score;
pub mod updater;

#[cfg(feature = "python")]
mod python;

pub use config::{HyperParam, LossKind, ScoreKind, UpdateKind};
pub use data::{DMatrix, Node, SparseRow};
pub use errors::{FMError, Result};
pub use loss::{LossFn, LossFunction};
pub use model::Model;
pub use score::{ScoreFn, ScoreFunction};
pub use updater::Updater;

/// Entry point for the FieldFM accelerator module.
#[cfg(feature = "python")]
#[pymodule]
fn _accel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<python::FMTrainer>()?;
    m.add_function(wrap_pyfunction!(parallel::py_init_accel_pool, m)?)?;
    m.add_function(wrap_pyfunction!(parallel::py_thread_count, m)?)?;

    Ok(())
}
