// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use super::LossFn;

/// Squared error `0.5 (p - y)^2`, so the gradient is the plain residual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SquaredLoss;

impl LossFn for SquaredLoss {
    fn loss(&self, pred: f32, label: f32) -> f64 {
        let err = pred as f64 - label as f64;
        0.5 * err * err
    }

    fn partial_grad(&self, score: f32, label: f32) -> f32 {
        score - label
    }
}
