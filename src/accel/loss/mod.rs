// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Loss functions and the training pass they drive.
//!
//! A loss function scores predictions against labels and, during training,
//! turns each row's raw score into the partial gradient that the score
//! function pushes back into the weights.

mod cross_entropy;
mod hinge;
mod squared;

pub use cross_entropy::CrossEntropyLoss;
pub use hinge::HingeLoss;
pub use squared::SquaredLoss;

use log::*;

use crate::config::{HyperParam, LossKind};
use crate::data::DMatrix;
use crate::errors::Result;
use crate::model::Model;
use crate::precondition;
use crate::progress::ProgressHandle;
use crate::score::ScoreFn;
use crate::updater::Updater;
use crate::with_score_fn;

/// Common interface for loss functions.
pub trait LossFn: Sync {
    /// Loss of a single prediction.
    fn loss(&self, pred: f32, label: f32) -> f64;

    /// Derivative of the loss with respect to the raw score.
    fn partial_grad(&self, score: f32, label: f32) -> f32;
}

/// Loss function variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossFunction {
    Squared(SquaredLoss),
    CrossEntropy(CrossEntropyLoss),
    Hinge(HingeLoss),
}

macro_rules! with_loss_fn {
    ($loss:expr, $lf:ident => $body:expr) => {
        match $loss {
            LossFunction::Squared($lf) => $body,
            LossFunction::CrossEntropy($lf) => $body,
            LossFunction::Hinge($lf) => $body,
        }
    };
}

impl LossFunction {
    pub fn new(kind: LossKind) -> LossFunction {
        match kind {
            LossKind::Squared => LossFunction::Squared(SquaredLoss),
            LossKind::CrossEntropy => LossFunction::CrossEntropy(CrossEntropyLoss),
            LossKind::Hinge => LossFunction::Hinge(HingeLoss),
        }
    }

    pub fn from_config(param: &HyperParam) -> LossFunction {
        LossFunction::new(param.loss_func)
    }

    pub fn kind(&self) -> LossKind {
        match self {
            LossFunction::Squared(_) => LossKind::Squared,
            LossFunction::CrossEntropy(_) => LossKind::CrossEntropy,
            LossFunction::Hinge(_) => LossKind::Hinge,
        }
    }

    /// Total loss of a set of predictions.
    pub fn evaluate(&self, pred: &[f32], labels: &[f32]) -> Result<f64> {
        precondition!(!pred.is_empty(), "cannot evaluate empty predictions");
        precondition!(
            pred.len() == labels.len(),
            "prediction count {} does not match label count {}",
            pred.len(),
            labels.len()
        );
        Ok(with_loss_fn!(self, lf => sum_loss(lf, pred, labels)))
    }

    /// Run one gradient pass over a matrix, updating the model in place.
    ///
    /// Rows are processed in order; each is scored with the weights left by
    /// the rows before it. Returns the summed loss of the pre-update scores.
    pub fn calc_grad(
        &self,
        matrix: &DMatrix,
        model: &mut Model,
        updater: &mut Updater,
    ) -> Result<f64> {
        self.calc_grad_with_progress(matrix, model, updater, &ProgressHandle::null())
    }

    /// Run one gradient pass, reporting each processed row to a progress handle.
    pub fn calc_grad_with_progress(
        &self,
        matrix: &DMatrix,
        model: &mut Model,
        updater: &mut Updater,
        progress: &ProgressHandle,
    ) -> Result<f64> {
        precondition!(!matrix.is_empty(), "cannot compute gradients over zero rows");
        model.check_matrix(matrix)?;
        precondition!(
            updater.len() == model.weights().len(),
            "updater covers {} parameters but the model has {}",
            updater.len(),
            model.weights().len()
        );

        let score = model.score_function();
        let weights = model.weights_mut();
        let loss = with_score_fn!(&score, sf => {
            with_loss_fn!(self, lf => grad_pass(sf, lf, matrix, weights, updater, progress))
        });
        debug!(
            "{} pass over {} rows ({} entries): loss {:.6}",
            self.kind(),
            matrix.len(),
            matrix.nnz(),
            loss
        );
        Ok(loss)
    }
}

fn sum_loss<L: LossFn>(loss: &L, pred: &[f32], labels: &[f32]) -> f64 {
    pred.iter()
        .zip(labels)
        .map(|(p, y)| loss.loss(*p, *y))
        .sum()
}

fn grad_pass<S: ScoreFn, L: LossFn>(
    score: &S,
    loss: &L,
    matrix: &DMatrix,
    weights: &mut [f32],
    updater: &mut Updater,
    progress: &ProgressHandle,
) -> f64 {
    let mut total = 0.0;
    for (row, label) in matrix.iter() {
        let s = score.calc_score(row, weights);
        total += loss.loss(s, label);
        let pg = loss.partial_grad(s, label);
        score.calc_grad(row, weights, pg, updater);
        progress.tick();
    }
    progress.flush();
    total
}

/// Map a label onto `{-1, +1}`.
#[inline]
pub(crate) fn binary_target(label: f32) -> f32 {
    if label > 0.0 {
        1.0
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::config::{ScoreKind, UpdateKind};
    use crate::data::Node;
    use crate::errors::FMError;
    use crate::predict::predict;

    fn toy_data() -> DMatrix {
        // label is positive iff feature 1 or 2 is present
        let patterns: &[(&[u32], f32)] = &[
            (&[1, 3], 1.0),
            (&[2, 4], 1.0),
            (&[1, 4], 1.0),
            (&[3, 4], 0.0),
            (&[3], 0.0),
            (&[4], 0.0),
            (&[2], 1.0),
            (&[3, 5], 0.0),
        ];
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for (feats, label) in patterns {
            rows.push(
                feats
                    .iter()
                    .map(|f| Node::new(f % 2, *f, 1.0))
                    .collect::<Vec<_>>(),
            );
            labels.push(*label);
        }
        DMatrix::from_parts(rows, labels).unwrap()
    }

    fn toy_param(kind: ScoreKind, loss: LossKind) -> HyperParam {
        HyperParam {
            score_func: kind,
            loss_func: loss,
            learning_rate: 0.1,
            regu_lambda: 0.0,
            num_feature: 6,
            num_field: 2,
            num_k: 4,
            ..Default::default()
        }
    }

    fn check_training_reduces_loss(param: HyperParam) {
        let data = toy_data();
        let loss = LossFunction::from_config(&param);
        let mut model = Model::new(&param).unwrap();
        let mut updater = Updater::from_config(&param).unwrap();

        let before = loss.evaluate(&predict(&data, &model).unwrap(), &data.labels).unwrap();
        for _ in 0..30 {
            loss.calc_grad(&data, &mut model, &mut updater).unwrap();
        }
        let after = loss.evaluate(&predict(&data, &model).unwrap(), &data.labels).unwrap();
        assert!(
            after < before,
            "{} loss went from {} to {}",
            param.score_func,
            before,
            after
        );
    }

    #[test]
    fn test_training_reduces_loss_linear() {
        check_training_reduces_loss(toy_param(ScoreKind::Linear, LossKind::CrossEntropy));
    }

    #[test]
    fn test_training_reduces_loss_fm() {
        check_training_reduces_loss(toy_param(ScoreKind::Fm, LossKind::CrossEntropy));
    }

    #[test]
    fn test_training_reduces_loss_ffm() {
        check_training_reduces_loss(toy_param(ScoreKind::Ffm, LossKind::CrossEntropy));
    }

    #[test]
    fn test_training_reduces_squared_loss_adagrad() {
        let param = HyperParam {
            updater: UpdateKind::Adagrad,
            ..toy_param(ScoreKind::Fm, LossKind::Squared)
        };
        check_training_reduces_loss(param);
    }

    #[test]
    fn test_zero_rows_rejected() {
        let param = toy_param(ScoreKind::Linear, LossKind::CrossEntropy);
        let mut model = Model::new(&param).unwrap();
        let mut updater = Updater::from_config(&param).unwrap();
        let loss = LossFunction::from_config(&param);
        let res = loss.calc_grad(&DMatrix::new(), &mut model, &mut updater);
        assert!(matches!(res, Err(FMError::Precondition(_))));
    }

    #[test]
    fn test_bad_row_rejected_before_update() {
        let param = toy_param(ScoreKind::Linear, LossKind::CrossEntropy);
        let mut model = Model::new(&param).unwrap();
        let mut updater = Updater::from_config(&param).unwrap();
        let data = DMatrix::from_parts(
            vec![vec![Node::new(0, 1, 1.0)], vec![Node::new(0, 99, 1.0)]],
            vec![1.0, 0.0],
        )
        .unwrap();
        let loss = LossFunction::from_config(&param);
        assert!(loss.calc_grad(&data, &mut model, &mut updater).is_err());
        assert!(model.weights().iter().all(|w| *w == 0.0));
    }

    #[test]
    fn test_evaluate_rejects_bad_input() {
        let loss = LossFunction::new(LossKind::Squared);
        assert!(matches!(loss.evaluate(&[], &[]), Err(FMError::Precondition(_))));
        assert!(matches!(
            loss.evaluate(&[1.0, 2.0], &[1.0]),
            Err(FMError::Precondition(_))
        ));
    }

    #[test]
    fn test_evaluate_sums() {
        let loss = LossFunction::new(LossKind::Squared);
        let total = loss.evaluate(&[1.0, 3.0], &[0.0, 1.0]).unwrap();
        assert_relative_eq!(total, 0.5 + 2.0);
    }

    #[test]
    fn test_grad_pass_reports_progress() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let param = toy_param(ScoreKind::Linear, LossKind::Hinge);
        let mut model = Model::new(&param).unwrap();
        let mut updater = Updater::from_config(&param).unwrap();
        let data = toy_data();
        let seen = Arc::new(AtomicUsize::new(0));
        let s2 = seen.clone();
        let pb = ProgressHandle::with_callback(move |n| s2.store(n, Ordering::Relaxed));
        LossFunction::from_config(&param)
            .calc_grad_with_progress(&data, &mut model, &mut updater, &pb)
            .unwrap();
        assert_eq!(seen.load(Ordering::Relaxed), data.len());
    }
}
