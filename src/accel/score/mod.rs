// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Score functions for linear, FM and FFM models.
//!
//! A score function turns a sparse row and the flat weight vector into a raw
//! prediction, and pushes a loss gradient back into every weight the row
//! touches.

mod ffm;
mod fm;
mod linear;

pub use ffm::FFMScore;
pub use fm::FMScore;
pub use linear::LinearScore;

use crate::config::{HyperParam, ScoreKind};
use crate::data::Node;
use crate::updater::Updater;

/// Common interface for score functions.
///
/// Implementations index the weight slice directly; rows must have been
/// checked against the model dimensions (see [crate::model::Model::check_row]).
pub trait ScoreFn: Sync {
    /// Compute the raw score of a row.
    fn calc_score(&self, row: &[Node], weights: &[f32]) -> f32;

    /// Update every weight the row touches, given the partial gradient `pg`
    /// of the loss with respect to the row's score.
    fn calc_grad(&self, row: &[Node], weights: &mut [f32], pg: f32, updater: &mut Updater);
}

/// Score function variants, selected once per model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreFunction {
    Linear(LinearScore),
    FM(FMScore),
    FFM(FFMScore),
}

impl ScoreFunction {
    /// Build a score function for a weight layout.
    pub fn new(kind: ScoreKind, num_feature: usize, num_field: usize, k: usize) -> ScoreFunction {
        match kind {
            ScoreKind::Linear => ScoreFunction::Linear(LinearScore),
            ScoreKind::Fm => ScoreFunction::FM(FMScore::new(num_feature, k)),
            ScoreKind::Ffm => ScoreFunction::FFM(FFMScore::new(num_feature, num_field, k)),
        }
    }

    /// Build the score function described by a configuration.
    pub fn from_config(param: &HyperParam) -> ScoreFunction {
        ScoreFunction::new(
            param.score_func,
            param.num_feature as usize,
            param.num_field as usize,
            param.num_k as usize,
        )
    }

    pub fn kind(&self) -> ScoreKind {
        match self {
            ScoreFunction::Linear(_) => ScoreKind::Linear,
            ScoreFunction::FM(_) => ScoreKind::Fm,
            ScoreFunction::FFM(_) => ScoreKind::Ffm,
        }
    }
}

/// Dispatch a generic call on the concrete score function.
///
/// This resolves the variant once, so loops inside `$body` are monomorphized.
#[macro_export]
macro_rules! with_score_fn {
    ($score:expr, $sf:ident => $body:expr) => {
        match $score {
            $crate::score::ScoreFunction::Linear($sf) => $body,
            $crate::score::ScoreFunction::FM($sf) => $body,
            $crate::score::ScoreFunction::FFM($sf) => $body,
        }
    };
}

impl ScoreFn for ScoreFunction {
    fn calc_score(&self, row: &[Node], weights: &[f32]) -> f32 {
        with_score_fn!(self, sf => sf.calc_score(row, weights))
    }

    fn calc_grad(&self, row: &[Node], weights: &mut [f32], pg: f32, updater: &mut Updater) {
        with_score_fn!(self, sf => sf.calc_grad(row, weights, pg, updater))
    }
}

/// Linear part of the score, with the bias counted exactly once.
///
/// A node with feature id 0 is the bias term; rows without one get `w[0]`
/// added implicitly.
#[inline]
pub(crate) fn linear_term(row: &[Node], weights: &[f32]) -> f32 {
    let mut sum = 0.0;
    let mut has_bias = false;
    for node in row {
        has_bias |= node.feat_id == 0;
        sum += weights[node.feat_id as usize] * node.feat_val;
    }
    if !has_bias {
        sum += weights[0];
    }
    sum
}

/// Gradient step for the linear weights (derivative `x_i`, or 1 for an
/// implicit bias).
#[inline]
pub(crate) fn linear_grad(row: &[Node], weights: &mut [f32], pg: f32, updater: &mut Updater) {
    let mut has_bias = false;
    for node in row {
        has_bias |= node.feat_id == 0;
        updater.update(weights, node.feat_id as usize, pg * node.feat_val);
    }
    if !has_bias {
        updater.update(weights, 0, pg);
    }
}
