// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Evaluation metrics over predictions and labels.
//!
//! Classification metrics treat labels `> 0` as positive and raw scores
//! `> 0` as a positive prediction.

use ordered_float::NotNan;

use crate::errors::{FMError, Result};
use crate::precondition;

fn check_inputs(pred: &[f32], labels: &[f32]) -> Result<()> {
    precondition!(!pred.is_empty(), "cannot compute metric over empty predictions");
    precondition!(
        pred.len() == labels.len(),
        "prediction count {} does not match label count {}",
        pred.len(),
        labels.len()
    );
    Ok(())
}

/// Fraction of rows whose predicted sign matches the label.
pub fn accuracy(pred: &[f32], labels: &[f32]) -> Result<f64> {
    check_inputs(pred, labels)?;
    let good = pred
        .iter()
        .zip(labels)
        .filter(|(p, y)| (**p > 0.0) == (**y > 0.0))
        .count();
    Ok(good as f64 / pred.len() as f64)
}

/// Area under the ROC curve, from the rank-sum statistic.
///
/// Tied scores share their average rank.
pub fn auc(pred: &[f32], labels: &[f32]) -> Result<f64> {
    check_inputs(pred, labels)?;
    let mut scored = Vec::with_capacity(pred.len());
    for (p, y) in pred.iter().zip(labels) {
        let p = NotNan::new(*p)
            .map_err(|_| FMError::Precondition("cannot rank NaN predictions".into()))?;
        scored.push((p, *y > 0.0));
    }
    scored.sort_unstable_by_key(|(p, _)| *p);

    let n_pos = scored.iter().filter(|(_, pos)| *pos).count();
    let n_neg = scored.len() - n_pos;
    precondition!(
        n_pos > 0 && n_neg > 0,
        "AUC needs both classes, got {} positive and {} negative",
        n_pos,
        n_neg
    );

    let mut pos_rank_sum = 0.0;
    let mut start = 0;
    while start < scored.len() {
        let mut end = start + 1;
        while end < scored.len() && scored[end].0 == scored[start].0 {
            end += 1;
        }
        // ranks are 1-based; the group covers start+1..=end
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        let group_pos = scored[start..end].iter().filter(|(_, pos)| *pos).count();
        pos_rank_sum += avg_rank * group_pos as f64;
        start = end;
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Ok((pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

/// Root mean squared error.
pub fn rmse(pred: &[f32], labels: &[f32]) -> Result<f64> {
    check_inputs(pred, labels)?;
    let sse: f64 = pred
        .iter()
        .zip(labels)
        .map(|(p, y)| {
            let e = *p as f64 - *y as f64;
            e * e
        })
        .sum();
    Ok((sse / pred.len() as f64).sqrt())
}

/// Mean absolute error.
pub fn mae(pred: &[f32], labels: &[f32]) -> Result<f64> {
    check_inputs(pred, labels)?;
    let sae: f64 = pred
        .iter()
        .zip(labels)
        .map(|(p, y)| (*p as f64 - *y as f64).abs())
        .sum();
    Ok(sae / pred.len() as f64)
}
