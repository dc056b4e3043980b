// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use super::{linear_grad, linear_term, ScoreFn};
use crate::data::Node;
use crate::updater::Updater;

/// Factorization machine score.
///
/// Each feature `f` owns a `K`-vector `v_f` starting at `num_feature + f * K`.
/// The pairwise term `Σ_{i<j} <v_i, v_j> x_i x_j` is computed with the usual
/// reformulation `0.5 * Σ_k [(Σ_i v_ik x_i)^2 - Σ_i v_ik^2 x_i^2]`, which is
/// linear in the row length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FMScore {
    num_feature: usize,
    k: usize,
}

impl FMScore {
    pub fn new(num_feature: usize, k: usize) -> FMScore {
        FMScore { num_feature, k }
    }

    /// Start of the latent block for a feature.
    #[inline]
    pub fn latent_offset(&self, feat: u32) -> usize {
        self.num_feature + feat as usize * self.k
    }

    /// Sum `Σ_i v_id x_i` over the row for latent dimension `d`.
    #[inline]
    fn dim_sum(&self, row: &[Node], weights: &[f32], d: usize) -> f32 {
        row.iter()
            .map(|n| weights[self.latent_offset(n.feat_id) + d] * n.feat_val)
            .sum()
    }

    /// Score a row by enumerating every feature pair.
    ///
    /// Quadratic in the row length; used to check the fast path.
    pub fn calc_score_pairwise(&self, row: &[Node], weights: &[f32]) -> f32 {
        let mut score = linear_term(row, weights);
        for (i, left) in row.iter().enumerate() {
            let lb = self.latent_offset(left.feat_id);
            for right in &row[i + 1..] {
                let rb = self.latent_offset(right.feat_id);
                let dot: f32 = (0..self.k).map(|d| weights[lb + d] * weights[rb + d]).sum();
                score += dot * left.feat_val * right.feat_val;
            }
        }
        score
    }
}

impl ScoreFn for FMScore {
    fn calc_score(&self, row: &[Node], weights: &[f32]) -> f32 {
        let mut inter = 0.0;
        for d in 0..self.k {
            let mut sum = 0.0;
            let mut sum_sq = 0.0;
            for node in row {
                let vx = weights[self.latent_offset(node.feat_id) + d] * node.feat_val;
                sum += vx;
                sum_sq += vx * vx;
            }
            inter += sum * sum - sum_sq;
        }
        linear_term(row, weights) + 0.5 * inter
    }

    fn calc_grad(&self, row: &[Node], weights: &mut [f32], pg: f32, updater: &mut Updater) {
        linear_grad(row, weights, pg, updater);

        // dimensions own disjoint slots, so each sum sees pre-update weights
        for d in 0..self.k {
            let sum = self.dim_sum(row, weights, d);
            for node in row {
                let x = node.feat_val;
                let idx = self.latent_offset(node.feat_id) + d;
                let grad = pg * x * (sum - weights[idx] * x);
                updater.update(weights, idx, grad);
            }
        }
    }
}
