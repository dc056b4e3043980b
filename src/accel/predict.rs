// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Batch prediction.

use log::*;
use rayon::prelude::*;

use crate::data::{DMatrix, SparseRow};
use crate::errors::Result;
use crate::model::Model;
use crate::score::ScoreFn;
use crate::with_score_fn;

/// Compute raw scores for every row of a matrix.
///
/// Rows are scored in parallel against the model's current weights; the
/// result does not depend on the thread count.
pub fn predict(matrix: &DMatrix, model: &Model) -> Result<Vec<f32>> {
    model.check_matrix(matrix)?;
    debug!("scoring {} rows", matrix.len());
    let score = model.score_function();
    let weights = model.weights();
    Ok(with_score_fn!(&score, sf => score_rows(sf, &matrix.rows, weights)))
}

/// Compute probabilities (sigmoid of the raw score) for every row.
pub fn predict_proba(matrix: &DMatrix, model: &Model) -> Result<Vec<f32>> {
    let mut scores = predict(matrix, model)?;
    scores.par_iter_mut().for_each(|s| *s = sigmoid(*s));
    Ok(scores)
}

fn score_rows<S: ScoreFn>(score: &S, rows: &[SparseRow], weights: &[f32]) -> Vec<f32> {
    rows.par_iter()
        .map(|row| score.calc_score(row, weights))
        .collect()
}

#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
