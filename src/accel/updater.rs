// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Per-parameter weight updates.

use log::*;

use crate::config::{HyperParam, UpdateKind};
use crate::errors::{FMError, Result};

const ADAGRAD_EPSILON: f32 = 1e-8;

/// Applies one optimizer step to individual weight slots.
///
/// Score functions call [Updater::update] once for every parameter a row
/// touches, with the raw partial derivative of the loss for that slot. L2
/// regularization is added here so each slot decays independently.
#[derive(Debug, Clone)]
pub struct Updater {
    learning_rate: f32,
    regu_lambda: f32,
    rule: UpdateKind,
    momentum: f32,
    n_params: usize,
    /// Per-slot optimizer state: squared-gradient sums for AdaGrad, velocity
    /// for momentum, empty for SGD.
    state: Vec<f32>,
}

impl Updater {
    /// Create an updater for `n_params` weights.
    ///
    /// `momentum` is only read by [UpdateKind::Momentum].
    pub fn new(
        rule: UpdateKind,
        learning_rate: f32,
        regu_lambda: f32,
        momentum: f32,
        n_params: usize,
    ) -> Result<Updater> {
        if n_params == 0 {
            return Err(FMError::Precondition(
                "updater needs a non-empty weight vector".into(),
            ));
        }
        if !(learning_rate > 0.0) {
            return Err(FMError::Config(format!(
                "learning rate must be positive, got {}",
                learning_rate
            )));
        }
        if !(regu_lambda >= 0.0) {
            return Err(FMError::Config(format!(
                "regularization must be non-negative, got {}",
                regu_lambda
            )));
        }
        let state = match rule {
            UpdateKind::Sgd => Vec::new(),
            UpdateKind::Adagrad | UpdateKind::Momentum => vec![0.0; n_params],
        };
        debug!(
            "initialized {:?} updater for {} parameters (lr={}, lambda={})",
            rule, n_params, learning_rate, regu_lambda
        );
        Ok(Updater {
            learning_rate,
            regu_lambda,
            rule,
            momentum,
            n_params,
            state,
        })
    }

    /// Create the updater a configuration asks for.
    pub fn from_config(param: &HyperParam) -> Result<Updater> {
        param.validate()?;
        Updater::new(
            param.updater,
            param.learning_rate,
            param.regu_lambda,
            param.momentum,
            param.num_param(),
        )
    }

    pub fn rule(&self) -> UpdateKind {
        self.rule
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Number of weight slots this updater serves.
    pub fn len(&self) -> usize {
        self.n_params
    }

    /// Compute the new value of slot `idx` given its current weight and
    /// the raw gradient.
    ///
    /// Panics if `idx` is outside the weight vector.
    #[inline]
    pub fn step(&mut self, idx: usize, weight: f32, grad: f32) -> f32 {
        assert!(
            idx < self.n_params,
            "update of slot {} outside weight vector of {} parameters",
            idx,
            self.n_params
        );
        let lr = self.learning_rate;
        let reg = self.regu_lambda;
        match self.rule {
            UpdateKind::Sgd => weight - lr * (grad + reg * weight),
            UpdateKind::Adagrad => {
                let g2 = &mut self.state[idx];
                *g2 += grad * grad;
                weight - lr * grad / (*g2 + ADAGRAD_EPSILON).sqrt() - lr * reg * weight
            }
            UpdateKind::Momentum => {
                let v = &mut self.state[idx];
                *v = self.momentum * *v + grad + reg * weight;
                weight - lr * *v
            }
        }
    }

    /// Update slot `idx` of `weights` in place.
    #[inline]
    pub fn update(&mut self, weights: &mut [f32], idx: usize, grad: f32) {
        debug_assert_eq!(weights.len(), self.n_params);
        let w = &mut weights[idx];
        *w = self.step(idx, *w, grad);
    }

    /// Get the optimizer state for a slot (squared-gradient sum or velocity).
    pub fn slot_state(&self, idx: usize) -> Option<f32> {
        self.state.get(idx).copied()
    }

    /// Forget all accumulated optimizer state.
    pub fn reset(&mut self) {
        self.state.fill(0.0);
    }
}
