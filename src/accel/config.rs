// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Training hyperparameters.

use std::fmt;
use std::str::FromStr;

use log::*;
use serde::{Deserialize, Serialize};

use crate::errors::{FMError, Result};

/// Largest weight vector an allocation can hold.
const MAX_PARAMS: usize = isize::MAX as usize / std::mem::size_of::<f32>();

/// Score function selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    Linear,
    Fm,
    Ffm,
}

/// Loss function selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    Squared,
    CrossEntropy,
    Hinge,
}

/// Parameter update rule selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    #[default]
    Sgd,
    Adagrad,
    Momentum,
}

/// Hyperparameters for a training run.
///
/// Built once and shared by reference; nothing in the engine mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyperParam {
    pub learning_rate: f32,
    pub regu_lambda: f32,
    pub loss_func: LossKind,
    pub score_func: ScoreKind,
    pub updater: UpdateKind,
    /// Velocity decay for the momentum updater.
    pub momentum: f32,
    pub num_feature: u32,
    pub num_field: u32,
    #[serde(rename = "num_K")]
    pub num_k: u32,
    /// Expected parameter count; checked against the layout when present.
    pub num_param: Option<u64>,
    pub seed: u64,
    /// Latent initialization scale; defaults to `1/sqrt(K)`.
    pub init_scale: Option<f32>,
}

impl Default for HyperParam {
    fn default() -> Self {
        HyperParam {
            learning_rate: 0.2,
            regu_lambda: 0.00002,
            loss_func: LossKind::CrossEntropy,
            score_func: ScoreKind::Linear,
            updater: UpdateKind::Sgd,
            momentum: 0.9,
            num_feature: 0,
            num_field: 0,
            num_k: 4,
            num_param: None,
            seed: 42,
            init_scale: None,
        }
    }
}

impl HyperParam {
    /// Parse and validate hyperparameters from JSON.
    pub fn from_json(text: &str) -> Result<HyperParam> {
        let param: HyperParam = serde_json::from_str(text)?;
        param.validate()?;
        debug!(
            "loaded {} / {} configuration with {} features",
            param.score_func, param.loss_func, param.num_feature
        );
        Ok(param)
    }

    /// Number of model parameters implied by the layout, or `None` if the
    /// weight vector would not fit in the address space.
    pub fn checked_num_param(&self) -> Option<usize> {
        let nf = self.num_feature as usize;
        let k = self.num_k as usize;
        let latent = match self.score_func {
            ScoreKind::Linear => Some(0),
            ScoreKind::Fm => nf.checked_mul(k),
            ScoreKind::Ffm => nf
                .checked_mul(self.num_field as usize)
                .and_then(|n| n.checked_mul(k)),
        }?;
        nf.checked_add(latent).filter(|n| *n <= MAX_PARAMS)
    }

    /// Total number of model parameters implied by the layout.
    ///
    /// Saturates to `usize::MAX` for layouts that [HyperParam::validate] rejects.
    pub fn num_param(&self) -> usize {
        self.checked_num_param().unwrap_or(usize::MAX)
    }

    /// Check the hyperparameters for consistency.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0) {
            return Err(FMError::Config(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.regu_lambda >= 0.0) {
            return Err(FMError::Config(format!(
                "regularization must be non-negative, got {}",
                self.regu_lambda
            )));
        }
        if self.num_feature == 0 {
            return Err(FMError::Config("model needs at least one feature".into()));
        }
        if self.score_func != ScoreKind::Linear && self.num_k == 0 {
            return Err(FMError::Config(format!(
                "{} model needs a positive latent dimension",
                self.score_func
            )));
        }
        if self.score_func == ScoreKind::Ffm && self.num_field == 0 {
            return Err(FMError::Config("ffm model needs at least one field".into()));
        }
        if self.updater == UpdateKind::Momentum && !(0.0..1.0).contains(&self.momentum) {
            return Err(FMError::Config(format!(
                "momentum must be in [0, 1), got {}",
                self.momentum
            )));
        }
        if let Some(scale) = self.init_scale {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(FMError::Config(format!(
                    "init_scale must be positive and finite, got {}",
                    scale
                )));
            }
        }
        let Some(size) = self.checked_num_param() else {
            return Err(FMError::Config(format!(
                "{} layout with {} features, {} fields and K={} is too large",
                self.score_func, self.num_feature, self.num_field, self.num_k
            )));
        };
        if let Some(np) = self.num_param {
            if np != size as u64 {
                return Err(FMError::Config(format!(
                    "num_param is {} but the {} layout needs {}",
                    np, self.score_func, size
                )));
            }
        }
        Ok(())
    }
}

impl FromStr for ScoreKind {
    type Err = FMError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(ScoreKind::Linear),
            "fm" => Ok(ScoreKind::Fm),
            "ffm" => Ok(ScoreKind::Ffm),
            _ => Err(FMError::Config(format!("unknown score function {:?}", s))),
        }
    }
}

impl FromStr for LossKind {
    type Err = FMError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "squared" => Ok(LossKind::Squared),
            "cross_entropy" => Ok(LossKind::CrossEntropy),
            "hinge" => Ok(LossKind::Hinge),
            _ => Err(FMError::Config(format!("unknown loss function {:?}", s))),
        }
    }
}

impl FromStr for UpdateKind {
    type Err = FMError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sgd" => Ok(UpdateKind::Sgd),
            "adagrad" => Ok(UpdateKind::Adagrad),
            "momentum" => Ok(UpdateKind::Momentum),
            _ => Err(FMError::Config(format!("unknown updater {:?}", s))),
        }
    }
}

impl fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScoreKind::Linear => "linear",
            ScoreKind::Fm => "fm",
            ScoreKind::Ffm => "ffm",
        })
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LossKind::Squared => "squared",
            LossKind::CrossEntropy => "cross_entropy",
            LossKind::Hinge => "hinge",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ffm_param() -> HyperParam {
        HyperParam {
            learning_rate: 0.1,
            regu_lambda: 0.0,
            score_func: ScoreKind::Ffm,
            num_feature: 3,
            num_field: 3,
            num_k: 24,
            ..Default::default()
        }
    }

    #[test]
    fn test_layout_sizes() {
        let mut param = ffm_param();
        assert_eq!(param.num_param(), 3 + 3 * 3 * 24);
        param.score_func = ScoreKind::Fm;
        assert_eq!(param.num_param(), 3 + 3 * 24);
        param.score_func = ScoreKind::Linear;
        assert_eq!(param.num_param(), 3);
    }

    #[test]
    fn test_from_json() {
        let param = HyperParam::from_json(
            r#"{"learning_rate": 0.1, "regu_lambda": 0.0, "loss_func": "squared",
                "score_func": "ffm", "num_feature": 3, "num_field": 3, "num_K": 24,
                "num_param": 219}"#,
        )
        .unwrap();
        let expected = HyperParam {
            loss_func: LossKind::Squared,
            num_param: Some(219),
            ..ffm_param()
        };
        assert_eq!(param, expected);
    }

    #[test]
    fn test_from_json_unknown_loss() {
        let res = HyperParam::from_json(r#"{"loss_func": "sqaured", "num_feature": 3}"#);
        assert!(matches!(res, Err(FMError::Json(_))));
    }

    #[test]
    fn test_num_param_mismatch() {
        let param = HyperParam {
            num_param: Some(10),
            ..ffm_param()
        };
        assert!(matches!(param.validate(), Err(FMError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_rates() {
        let param = HyperParam {
            learning_rate: 0.0,
            ..ffm_param()
        };
        assert!(param.validate().is_err());
        let param = HyperParam {
            regu_lambda: -1.0,
            ..ffm_param()
        };
        assert!(param.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_layout() {
        let param = HyperParam {
            num_feature: 1 << 20,
            num_field: 1 << 20,
            num_k: 1 << 24,
            ..ffm_param()
        };
        assert_eq!(param.checked_num_param(), None);
        assert_eq!(param.num_param(), usize::MAX);
        let err = param.validate().unwrap_err();
        assert!(matches!(err, FMError::Config(_)));
        assert!(err.to_string().contains("too large"));

        let param = HyperParam {
            score_func: ScoreKind::Fm,
            num_feature: u32::MAX,
            num_k: u32::MAX,
            ..ffm_param()
        };
        assert!(matches!(param.validate(), Err(FMError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_init_scale() {
        for scale in [-0.5, 0.0, f32::NAN, f32::INFINITY] {
            let param = HyperParam {
                init_scale: Some(scale),
                ..ffm_param()
            };
            assert!(
                matches!(param.validate(), Err(FMError::Config(_))),
                "init_scale {} accepted",
                scale
            );
        }
        let param = HyperParam {
            init_scale: Some(0.01),
            ..ffm_param()
        };
        param.validate().unwrap();
    }

    #[test]
    fn test_ffm_needs_fields() {
        let param = HyperParam {
            num_field: 0,
            ..ffm_param()
        };
        assert!(param.validate().is_err());
    }

    #[test]
    fn test_parse_selectors() {
        assert_eq!("ffm".parse::<ScoreKind>().unwrap(), ScoreKind::Ffm);
        assert_eq!("cross_entropy".parse::<LossKind>().unwrap(), LossKind::CrossEntropy);
        assert_eq!("adagrad".parse::<UpdateKind>().unwrap(), UpdateKind::Adagrad);
        assert!("deep".parse::<ScoreKind>().is_err());
    }
}
