// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use super::{linear_grad, linear_term, ScoreFn};
use crate::data::Node;
use crate::updater::Updater;

/// Field-aware factorization machine score.
///
/// Every feature owns one `K`-vector per field; the vector for feature `f`
/// facing field `g` starts at `num_feature + (f * num_field + g) * K`. A pair
/// `(i, j)` contributes `<v_{i,field_j}, v_{j,field_i}> x_i x_j`, so there is
/// no linear-time shortcut and the cost is quadratic in the row length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FFMScore {
    num_feature: usize,
    num_field: usize,
    k: usize,
}

impl FFMScore {
    pub fn new(num_feature: usize, num_field: usize, k: usize) -> FFMScore {
        FFMScore {
            num_feature,
            num_field,
            k,
        }
    }

    /// Start of the latent block for `feat` facing `field`.
    #[inline]
    pub fn latent_offset(&self, feat: u32, field: u32) -> usize {
        self.num_feature + (feat as usize * self.num_field + field as usize) * self.k
    }
}

impl ScoreFn for FFMScore {
    fn calc_score(&self, row: &[Node], weights: &[f32]) -> f32 {
        let mut inter = 0.0;
        for (i, left) in row.iter().enumerate() {
            for right in &row[i + 1..] {
                let lb = self.latent_offset(left.feat_id, right.field_id);
                let rb = self.latent_offset(right.feat_id, left.field_id);
                let lv = &weights[lb..lb + self.k];
                let rv = &weights[rb..rb + self.k];
                let dot: f32 = lv.iter().zip(rv).map(|(a, b)| a * b).sum();
                inter += dot * left.feat_val * right.feat_val;
            }
        }
        linear_term(row, weights) + inter
    }

    fn calc_grad(&self, row: &[Node], weights: &mut [f32], pg: f32, updater: &mut Updater) {
        linear_grad(row, weights, pg, updater);

        for (i, left) in row.iter().enumerate() {
            for right in &row[i + 1..] {
                let lb = self.latent_offset(left.feat_id, right.field_id);
                let rb = self.latent_offset(right.feat_id, left.field_id);
                let scale = pg * left.feat_val * right.feat_val;
                for d in 0..self.k {
                    // both partners read before either is written
                    let lv = weights[lb + d];
                    let rv = weights[rb + d];
                    updater.update(weights, lb + d, scale * rv);
                    updater.update(weights, rb + d, scale * lv);
                }
            }
        }
    }
}
