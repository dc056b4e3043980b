// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use super::{linear_grad, linear_term, ScoreFn};
use crate::data::Node;
use crate::updater::Updater;

/// Linear (logistic regression) score: `w_0 + Σ w_i x_i`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinearScore;

impl ScoreFn for LinearScore {
    fn calc_score(&self, row: &[Node], weights: &[f32]) -> f32 {
        linear_term(row, weights)
    }

    fn calc_grad(&self, row: &[Node], weights: &mut [f32], pg: f32, updater: &mut Updater) {
        linear_grad(row, weights, pg, updater)
    }
}
