// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Model parameters and their layout.

use log::*;
use ndarray::{ArrayView2, ArrayView3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::config::{HyperParam, ScoreKind};
use crate::data::{DMatrix, Node};
use crate::errors::{FMError, Result};
use crate::score::ScoreFunction;

/// A trained or in-training model: the flat weight vector plus its layout.
///
/// Linear weights (one per feature, bias at 0) come first, followed by the
/// latent factors. The vector is sized once here and never resized.
#[derive(Debug, Clone)]
pub struct Model {
    score_kind: ScoreKind,
    num_feature: usize,
    num_field: usize,
    k: usize,
    weights: Vec<f32>,
}

impl Model {
    /// Create a model with every weight set to `value`.
    pub fn with_constant(param: &HyperParam, value: f32) -> Result<Model> {
        param.validate()?;
        let n = param.num_param();
        debug!(
            "allocating {} model with {} parameters",
            param.score_func, n
        );
        Ok(Model {
            score_kind: param.score_func,
            num_feature: param.num_feature as usize,
            num_field: param.num_field as usize,
            k: param.num_k as usize,
            weights: vec![value; n],
        })
    }

    /// Create a model with zero linear weights and random latent factors.
    ///
    /// Latent factors are drawn uniformly from `[0, scale)` where `scale`
    /// defaults to `1/sqrt(K)`; the draw is seeded from the configuration so
    /// repeated runs start identically.
    pub fn new(param: &HyperParam) -> Result<Model> {
        let mut model = Model::with_constant(param, 0.0)?;
        if model.score_kind != ScoreKind::Linear {
            let scale = param
                .init_scale
                .unwrap_or_else(|| 1.0 / (model.k as f32).sqrt());
            let mut rng = Pcg64::seed_from_u64(param.seed);
            let nf = model.num_feature;
            for w in &mut model.weights[nf..] {
                *w = rng.random::<f32>() * scale;
            }
        }
        Ok(model)
    }

    /// Wrap an existing weight vector, checking its length against the layout.
    pub fn from_weights(param: &HyperParam, weights: Vec<f32>) -> Result<Model> {
        let mut model = Model::with_constant(param, 0.0)?;
        if weights.len() != model.weights.len() {
            return Err(FMError::Precondition(format!(
                "{} model needs {} weights, got {}",
                model.score_kind,
                model.weights.len(),
                weights.len()
            )));
        }
        model.weights = weights;
        Ok(model)
    }

    pub fn score_kind(&self) -> ScoreKind {
        self.score_kind
    }

    pub fn num_feature(&self) -> usize {
        self.num_feature
    }

    pub fn num_field(&self) -> usize {
        self.num_field
    }

    pub fn num_k(&self) -> usize {
        self.k
    }

    /// The score function matching this model's layout.
    pub fn score_function(&self) -> ScoreFunction {
        ScoreFunction::new(self.score_kind, self.num_feature, self.num_field, self.k)
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    /// Get the linear weights (bias first).
    pub fn linear_weights(&self) -> &[f32] {
        &self.weights[..self.num_feature]
    }

    /// View FM latent factors as a `(num_feature, K)` matrix.
    pub fn fm_factors(&self) -> Option<ArrayView2<'_, f32>> {
        if self.score_kind != ScoreKind::Fm {
            return None;
        }
        ArrayView2::from_shape((self.num_feature, self.k), &self.weights[self.num_feature..]).ok()
    }

    /// View FFM latent factors as a `(num_feature, num_field, K)` array.
    pub fn ffm_factors(&self) -> Option<ArrayView3<'_, f32>> {
        if self.score_kind != ScoreKind::Ffm {
            return None;
        }
        ArrayView3::from_shape(
            (self.num_feature, self.num_field, self.k),
            &self.weights[self.num_feature..],
        )
        .ok()
    }

    /// Check that a row only references features (and fields) the model has.
    pub fn check_row(&self, row: &[Node]) -> Result<()> {
        for node in row {
            if node.feat_id as usize >= self.num_feature {
                return Err(FMError::OutOfRange {
                    what: "feature id",
                    index: node.feat_id as usize,
                    limit: self.num_feature,
                });
            }
            if self.score_kind == ScoreKind::Ffm && node.field_id as usize >= self.num_field {
                return Err(FMError::OutOfRange {
                    what: "field id",
                    index: node.field_id as usize,
                    limit: self.num_field,
                });
            }
        }
        Ok(())
    }

    /// Check every row of a matrix, along with its row/label agreement.
    pub fn check_matrix(&self, matrix: &DMatrix) -> Result<()> {
        matrix.check()?;
        for (i, row) in matrix.rows.iter().enumerate() {
            self.check_row(row).map_err(|e| {
                debug!("row {} failed validation: {}", i, e);
                match e {
                    FMError::OutOfRange { what, index, limit } => FMError::Precondition(format!(
                        "row {}: {} {} out of range (limit {})",
                        i, what, index, limit
                    )),
                    e => e,
                }
            })?;
        }
        Ok(())
    }
}
