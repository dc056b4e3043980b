// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Python bindings for training and scoring.

use arrow::{
    array::{make_array, Array, ArrayData, Float32Array},
    pyarrow::PyArrowType,
};
use log::*;
use numpy::PyArray1;
use pyo3::{prelude::*, types::PyDict};

use crate::config::HyperParam;
use crate::data::DMatrix;
use crate::loss::LossFunction;
use crate::metric;
use crate::model::Model;
use crate::predict::predict;
use crate::progress::ProgressHandle;
use crate::updater::Updater;

fn import_matrix(
    rows: PyArrowType<ArrayData>,
    labels: Option<PyArrowType<ArrayData>>,
) -> PyResult<DMatrix> {
    let rows = make_array(rows.0);
    let matrix = match labels {
        Some(labels) => DMatrix::from_arrow(&rows, &make_array(labels.0))?,
        None => {
            let zeros = Float32Array::from(vec![0.0; rows.len()]);
            DMatrix::from_arrow(&rows, &zeros)?
        }
    };
    Ok(matrix)
}

/// Train linear, FM and FFM models.
#[pyclass]
pub struct FMTrainer {
    param: HyperParam,
    loss: LossFunction,
    model: Model,
    updater: Updater,
}

#[pymethods]
impl FMTrainer {
    /// Instantiate a new trainer from a JSON configuration.
    #[new]
    #[pyo3(signature = (config, seed=None))]
    fn new(config: &str, seed: Option<u64>) -> PyResult<Self> {
        let mut param = HyperParam::from_json(config)?;
        if let Some(seed) = seed {
            param.seed = seed;
        }
        let model = Model::new(&param)?;
        let updater = Updater::from_config(&param)?;
        let loss = LossFunction::from_config(&param);
        info!(
            "created {} trainer with {} parameters",
            param.score_func,
            model.weights().len()
        );
        Ok(FMTrainer {
            param,
            loss,
            model,
            updater,
        })
    }

    /// Train for one epoch, returning the mean training loss.
    #[pyo3(signature = (rows, labels, progress=None))]
    fn fit_epoch<'py>(
        &mut self,
        py: Python<'py>,
        rows: PyArrowType<ArrayData>,
        labels: PyArrowType<ArrayData>,
        progress: Option<Bound<'py, PyAny>>,
    ) -> PyResult<f64> {
        let matrix = import_matrix(rows, Some(labels))?;
        let pb = ProgressHandle::from_input(progress);
        let loss = &self.loss;
        let model = &mut self.model;
        let updater = &mut self.updater;
        let total =
            py.allow_threads(|| loss.calc_grad_with_progress(&matrix, model, updater, &pb))?;
        Ok(total / matrix.len() as f64)
    }

    /// Compute raw scores for a batch of rows.
    fn predict<'py>(
        &self,
        py: Python<'py>,
        rows: PyArrowType<ArrayData>,
    ) -> PyResult<Bound<'py, PyArray1<f32>>> {
        let matrix = import_matrix(rows, None)?;
        let preds = py.allow_threads(|| predict(&matrix, &self.model))?;
        Ok(PyArray1::from_vec(py, preds))
    }

    /// Evaluate the model on labeled rows.
    ///
    /// Returns a dictionary with the mean loss and error metrics, plus AUC
    /// when both classes are present.
    fn evaluate<'py>(
        &self,
        py: Python<'py>,
        rows: PyArrowType<ArrayData>,
        labels: PyArrowType<ArrayData>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let matrix = import_matrix(rows, Some(labels))?;
        let preds = py.allow_threads(|| predict(&matrix, &self.model))?;
        let labels = &matrix.labels;

        let out = PyDict::new(py);
        let loss = self.loss.evaluate(&preds, labels)?;
        out.set_item("loss", loss / preds.len() as f64)?;
        out.set_item("accuracy", metric::accuracy(&preds, labels)?)?;
        out.set_item("rmse", metric::rmse(&preds, labels)?)?;
        out.set_item("mae", metric::mae(&preds, labels)?)?;
        match metric::auc(&preds, labels) {
            Ok(auc) => out.set_item("auc", auc)?,
            Err(e) => debug!("skipping AUC: {}", e),
        }
        Ok(out)
    }

    /// Get a copy of the current weight vector.
    fn weights<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f32>> {
        PyArray1::from_slice(py, self.model.weights())
    }

    /// Forget the optimizer state (AdaGrad sums or momentum).
    fn reset_updater(&mut self) {
        self.updater.reset();
    }

    #[getter]
    fn num_param(&self) -> usize {
        self.param.num_param()
    }
}
