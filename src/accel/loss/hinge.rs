// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use super::{binary_target, LossFn};

/// Hinge loss `max(0, 1 - y p)` with `y` in `{-1, +1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HingeLoss;

impl LossFn for HingeLoss {
    fn loss(&self, pred: f32, label: f32) -> f64 {
        let y = binary_target(label) as f64;
        (1.0 - y * pred as f64).max(0.0)
    }

    fn partial_grad(&self, score: f32, label: f32) -> f32 {
        let y = binary_target(label);
        if y * score < 1.0 {
            -y
        } else {
            0.0
        }
    }
}
