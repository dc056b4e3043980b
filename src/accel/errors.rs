// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Error types for the training engine.

use std::io;
use std::path::PathBuf;

use arrow_schema::ArrowError;
use thiserror::Error;

/// Result type used throughout the engine.
pub type Result<T> = std::result::Result<T, FMError>;

/// Errors raised by the engine.
#[derive(Error, Debug)]
pub enum FMError {
    /// A caller broke an invariant (empty input, mismatched lengths, etc.).
    #[error("precondition failed: {0}")]
    Precondition(String),
    /// An id exceeded the configured model dimensions.
    #[error("{what} {index} out of range (limit {limit})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        limit: usize,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt matrix file {}: {msg}", path.display())]
    Format { path: PathBuf, msg: String },
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FMError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> FMError {
        FMError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Return a [FMError::Precondition] unless the condition holds.
#[macro_export]
macro_rules! precondition {
    ($cond:expr, $($arg:expr),*) => {
        if !$cond {
            return Err($crate::errors::FMError::Precondition(format!($($arg),*)));
        }
    };
}

#[cfg(feature = "python")]
impl From<FMError> for pyo3::PyErr {
    fn from(value: FMError) -> Self {
        use pyo3::exceptions::{PyIndexError, PyOSError, PyTypeError, PyValueError};

        match value {
            FMError::OutOfRange { .. } => PyIndexError::new_err(value.to_string()),
            FMError::Io { .. } | FMError::Format { .. } => PyOSError::new_err(value.to_string()),
            FMError::Arrow(_) => PyTypeError::new_err(value.to_string()),
            _ => PyValueError::new_err(value.to_string()),
        }
    }
}
