// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use super::{binary_target, LossFn};

/// Logistic loss `log(1 + exp(-y p))` with `y` in `{-1, +1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrossEntropyLoss;

/// `log(1 + exp(x))` without overflow for large `x`.
#[inline]
pub(crate) fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

impl LossFn for CrossEntropyLoss {
    fn loss(&self, pred: f32, label: f32) -> f64 {
        let y = binary_target(label) as f64;
        softplus(-y * pred as f64)
    }

    fn partial_grad(&self, score: f32, label: f32) -> f32 {
        let y = binary_target(label);
        -y / (1.0 + 1.0 / (-y * score).exp())
    }
}
