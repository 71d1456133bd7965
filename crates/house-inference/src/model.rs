//! Regressors and the model artifact format.
//!
//! This module provides:
//!
//! - [`Regressor`], the capability the predictor needs from a trained model
//! - [`LinearModel`], the reference artifact: a JSON file holding the scheme
//!   version, the feature names, one coefficient per feature and an intercept
//! - [`ModelState`], a loaded model or the reason there is none
//!
//! # Artifact format
//!
//! ```json
//! {
//!   "scheme_version": "onehot-v1",
//!   "feature_names": ["sqft", "bedrooms", "...", "condition_excellent"],
//!   "coefficients": [150.0, 10000.0, "..."],
//!   "intercept": 25000.0
//! }
//! ```
//!
//! Loading checks the artifact against the encoder: a different scheme
//! version or different feature names (in name or order) is a
//! [`SchemaMismatch`](InferenceError::SchemaMismatch), never a silent
//! misprediction.

use crate::error::{InferenceError, Result};
use crate::features::{FEATURE_COUNT, FEATURE_NAMES, FeatureMatrix, SCHEME_VERSION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// A trained regression model.
///
/// Implementations must be read-only after construction so one instance can
/// serve concurrent callers.
pub trait Regressor: Send + Sync + fmt::Debug {
    /// One prediction per row of `features`, in row order.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>>;

    /// Per-feature importance reported by the model itself, if it has any.
    fn feature_importance(&self) -> Option<BTreeMap<String, f64>> {
        None
    }
}

/// Linear regressor over the `onehot-v1` features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    scheme_version: String,
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    /// Build a model for the current scheme.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::InvalidConfig`] unless there is exactly one
    /// finite coefficient per feature and the intercept is finite.
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        let model = Self {
            scheme_version: SCHEME_VERSION.to_string(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            coefficients,
            intercept,
        };
        model
            .check_weights()
            .map_err(InferenceError::InvalidConfig)?;
        Ok(model)
    }

    /// Load and validate a JSON artifact.
    ///
    /// # Errors
    ///
    /// - [`InferenceError::ModelNotFound`] if the file does not exist
    /// - [`InferenceError::ModelCorrupt`] if it is not a valid artifact
    /// - [`InferenceError::SchemaMismatch`] if it was trained on other features
    #[must_use = "returns the loaded model; use it or handle the error"]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InferenceError::ModelNotFound {
                path: path.display().to_string(),
            });
        }

        let bytes = fs::read(path)?;
        let model = Self::from_bytes(&bytes).map_err(|e| match e {
            InferenceError::ModelCorrupt { reason, .. } => InferenceError::ModelCorrupt {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;

        info!(
            "Loaded linear model from {} ({} features)",
            path.display(),
            model.coefficients.len()
        );
        Ok(model)
    }

    /// Parse and validate an artifact from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let corrupt = |reason: String| InferenceError::ModelCorrupt {
            path: "<bytes>".to_string(),
            reason,
        };

        let model: Self = serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;

        if model.scheme_version != SCHEME_VERSION {
            return Err(InferenceError::SchemaMismatch {
                expected: SCHEME_VERSION.to_string(),
                found: model.scheme_version,
            });
        }
        if model.feature_names != FEATURE_NAMES {
            return Err(InferenceError::SchemaMismatch {
                expected: FEATURE_NAMES.join(","),
                found: model.feature_names.join(","),
            });
        }
        model.check_weights().map_err(corrupt)?;

        Ok(model)
    }

    /// Write the artifact as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn scheme_version(&self) -> &str {
        &self.scheme_version
    }

    fn check_weights(&self) -> std::result::Result<(), String> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(format!(
                "expected {} coefficients, found {}",
                FEATURE_COUNT,
                self.coefficients.len()
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("weights must be finite".to_string());
        }
        Ok(())
    }
}

impl Regressor for LinearModel {
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        Ok(features
            .rows()
            .iter()
            .map(|row| {
                row.as_slice()
                    .iter()
                    .zip(&self.coefficients)
                    .map(|(x, w)| x * w)
                    .sum::<f64>()
                    + self.intercept
            })
            .collect())
    }
}

/// The model a predictor serves with, or why it has none.
#[derive(Debug, Clone)]
pub enum ModelState {
    Ready(Arc<dyn Regressor>),
    Unavailable { reason: String },
}

impl ModelState {
    /// Load a [`LinearModel`] artifact.
    ///
    /// Never fails: a load error is logged and kept as
    /// [`ModelState::Unavailable`].
    pub fn load_linear(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match LinearModel::load(path) {
            Ok(model) => Self::Ready(Arc::new(model)),
            Err(e) => {
                error!("Failed to load model from {}: {}", path.display(), e);
                Self::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The loaded regressor.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::ModelUnavailable`] for the unavailable state.
    pub fn regressor(&self) -> Result<&Arc<dyn Regressor>> {
        match self {
            Self::Ready(regressor) => Ok(regressor),
            Self::Unavailable { reason } => Err(InferenceError::ModelUnavailable(reason.clone())),
        }
    }
}

impl<R: Regressor + 'static> From<R> for ModelState {
    fn from(regressor: R) -> Self {
        Self::Ready(Arc::new(regressor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureEncoder;
    use crate::types::RawHouseRecord;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample_model() -> LinearModel {
        LinearModel::new(
            vec![150.0, 10_000.0, 8_000.0, -500.0, 0.0, 40_000.0, 20_000.0, 0.0, 15_000.0, 30_000.0],
            25_000.0,
        )
        .unwrap()
    }

    #[test]
    fn test_linear_predict() {
        let encoder = FeatureEncoder::new(2025);
        let matrix = encoder
            .encode_batch(&[RawHouseRecord::new(2000.0, 3, 2.0, "Urban", 2000, "Good")])
            .unwrap();

        let prediction = sample_model().predict(&matrix).unwrap();

        // 300000 + 30000 + 16000 - 12500 + 40000 + 15000 + 25000
        assert_eq!(prediction, vec![413_500.0]);
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = LinearModel::new(vec![1.0; 3], 0.0).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidConfig(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("models").join("model.json");
        let model = sample_model();

        model.save(&path).unwrap();
        let loaded = LinearModel::load(&path).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = LinearModel::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, InferenceError::ModelNotFound { .. }));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, b"{\"scheme_version\": \"onehot-v1\", \"coeff").unwrap();

        let err = LinearModel::load(&path).unwrap_err();
        match err {
            InferenceError::ModelCorrupt { path: p, .. } => assert!(p.ends_with("model.json")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_scheme_version_mismatch() {
        let json = serde_json::json!({
            "scheme_version": "transformer-v1",
            "feature_names": FEATURE_NAMES,
            "coefficients": vec![0.0; FEATURE_COUNT],
            "intercept": 0.0,
        });
        let err = LinearModel::from_bytes(json.to_string().as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::SchemaMismatch { ref found, .. } if found == "transformer-v1"
        ));
    }

    #[test]
    fn test_feature_order_mismatch() {
        let mut names: Vec<&str> = FEATURE_NAMES.to_vec();
        names.swap(0, 1);
        let json = serde_json::json!({
            "scheme_version": SCHEME_VERSION,
            "feature_names": names,
            "coefficients": vec![0.0; FEATURE_COUNT],
            "intercept": 0.0,
        });
        let err = LinearModel::from_bytes(json.to_string().as_bytes()).unwrap_err();
        assert!(err.is_model_error());
        assert_eq!(err.error_code(), "SCHEMA_MISMATCH");
    }

    #[test]
    fn test_coefficient_count_mismatch() {
        let json = serde_json::json!({
            "scheme_version": SCHEME_VERSION,
            "feature_names": FEATURE_NAMES,
            "coefficients": [1.0, 2.0],
            "intercept": 0.0,
        });
        let err = LinearModel::from_bytes(json.to_string().as_bytes()).unwrap_err();
        assert_eq!(err.error_code(), "MODEL_CORRUPT");
    }

    #[test]
    fn test_model_state() {
        let ready = ModelState::from(sample_model());
        assert!(ready.is_ready());
        assert!(ready.regressor().is_ok());

        let dir = tempdir().unwrap();
        let unavailable = ModelState::load_linear(dir.path().join("absent.json"));
        assert!(!unavailable.is_ready());
        let err = unavailable.regressor().unwrap_err();
        assert!(err.is_model_unavailable());
        assert!(err.to_string().contains("Model not found"));
    }
}
