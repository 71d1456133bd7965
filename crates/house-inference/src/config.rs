//! Configuration for the predictor.
//!
//! This module provides [`PredictorConfig`] and its builder.
//!
//! # Example
//!
//! ```
//! use house_inference::PredictorConfig;
//!
//! let config = PredictorConfig::builder()
//!     .model_path("models/trained/house_price_model.json")
//!     .reference_year(2025)
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::InferenceError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the trained model artifact.
pub const DEFAULT_MODEL_PATH: &str = "models/trained/house_price_model.json";

/// Environment variable overriding [`DEFAULT_MODEL_PATH`].
pub const MODEL_PATH_ENV: &str = "HOUSE_MODEL_PATH";

/// Earliest reference year accepted by the builder.
const MIN_REFERENCE_YEAR: i32 = 1800;

/// Configuration for a [`Predictor`](crate::Predictor).
///
/// # Validation
///
/// When built via [`PredictorConfig::builder()`], the following constraints are enforced:
/// - `model_path` must not be empty
/// - `reference_year`, when set, must be at least 1800
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Path of the JSON model artifact.
    pub model_path: PathBuf,

    /// Year used to compute `house_age`.
    ///
    /// Must equal the year the model was trained with. If `None`, the
    /// current calendar year is read once when the predictor is built.
    pub reference_year: Option<i32>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            reference_year: None,
        }
    }
}

impl PredictorConfig {
    /// Create a new builder for `PredictorConfig`.
    #[must_use]
    pub fn builder() -> PredictorConfigBuilder {
        PredictorConfigBuilder::default()
    }

    /// Default configuration with the model path taken from
    /// `HOUSE_MODEL_PATH` when it is set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var(MODEL_PATH_ENV)
            && !path.trim().is_empty()
        {
            config.model_path = PathBuf::from(path);
        }
        config
    }
}

/// Builder for [`PredictorConfig`].
#[derive(Debug, Clone, Default)]
pub struct PredictorConfigBuilder {
    config: PredictorConfig,
}

impl PredictorConfigBuilder {
    /// Set the model artifact path.
    #[must_use]
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.model_path = path.into();
        self
    }

    /// Pin the reference year used for `house_age`.
    #[must_use]
    pub fn reference_year(mut self, year: i32) -> Self {
        self.config.reference_year = Some(year);
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::InvalidConfig`] if:
    /// - `model_path` is empty
    /// - `reference_year` is before 1800
    pub fn build(self) -> Result<PredictorConfig, InferenceError> {
        if self.config.model_path.as_os_str().is_empty() {
            return Err(InferenceError::InvalidConfig(
                "model_path must not be empty".to_string(),
            ));
        }

        if let Some(year) = self.config.reference_year
            && year < MIN_REFERENCE_YEAR
        {
            return Err(InferenceError::InvalidConfig(format!(
                "reference_year must be at least {}, got {}",
                MIN_REFERENCE_YEAR, year
            )));
        }

        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PredictorConfig::default();
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(config.reference_year, None);
    }

    #[test]
    fn test_builder() {
        let config = PredictorConfig::builder()
            .model_path("/tmp/model.json")
            .reference_year(2025)
            .build()
            .unwrap();

        assert_eq!(config.model_path, PathBuf::from("/tmp/model.json"));
        assert_eq!(config.reference_year, Some(2025));
    }

    #[test]
    fn test_empty_model_path() {
        let result = PredictorConfig::builder().model_path("").build();
        assert!(matches!(result, Err(InferenceError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_reference_year() {
        let result = PredictorConfig::builder().reference_year(25).build();
        assert!(result.is_err());
    }
}
