//! Configuration types for the data cleaning pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};

/// Default fraction of rows the outlier detector is expected to flag.
pub const DEFAULT_CONTAMINATION: f64 = 0.05;

/// Default seed for the outlier detector's internal randomness.
pub const DEFAULT_RANDOM_STATE: u64 = 42;

/// Configuration for the isolation forest used by the outlier filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Number of isolation trees in the ensemble.
    /// Default: 100
    pub n_estimators: usize,

    /// Maximum number of rows sampled to build each tree.
    /// The effective sample size is `min(max_samples, n_rows)`.
    /// Default: 256
    pub max_samples: usize,

    /// Seed for subsampling and split selection.
    /// Default: 42
    pub random_state: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            random_state: DEFAULT_RANDOM_STATE,
        }
    }
}

/// Configuration for the cleaning pipeline.
///
/// Use [`CleaningConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use house_processing::config::CleaningConfig;
///
/// let config = CleaningConfig::builder()
///     .outlier_columns(["price"])
///     .contamination(0.05)
///     .random_state(42)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Columns screened by the outlier detector.
    /// Default: `["price"]`
    pub outlier_columns: Vec<String>,

    /// Expected fraction of anomalous rows, in `(0.0, 0.5]`.
    /// Default: 0.05
    pub contamination: f64,

    /// Whether to run the outlier filter after imputation.
    /// Default: true
    pub remove_outliers: bool,

    /// Isolation forest parameters.
    pub detector: DetectorConfig,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            outlier_columns: vec!["price".to_string()],
            contamination: DEFAULT_CONTAMINATION,
            remove_outliers: true,
            detector: DetectorConfig::default(),
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        validate_contamination(self.contamination)?;

        if self.remove_outliers && self.outlier_columns.is_empty() {
            return Err(ConfigValidationError::NoOutlierColumns);
        }

        if self.detector.n_estimators == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "n_estimators".to_string(),
            });
        }

        if self.detector.max_samples < 2 {
            return Err(ConfigValidationError::InvalidCount {
                field: "max_samples".to_string(),
            });
        }

        Ok(())
    }
}

/// Check that a contamination rate lies in `(0.0, 0.5]`.
pub fn validate_contamination(contamination: f64) -> Result<(), ConfigValidationError> {
    if contamination.is_finite() && contamination > 0.0 && contamination <= 0.5 {
        Ok(())
    } else {
        Err(ConfigValidationError::InvalidContamination(contamination))
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid contamination: {0} (must be in (0.0, 0.5])")]
    InvalidContamination(f64),

    #[error("Outlier removal is enabled but no outlier columns were given")]
    NoOutlierColumns,

    #[error("Invalid value for '{field}' (too small)")]
    InvalidCount { field: String },
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    outlier_columns: Option<Vec<String>>,
    contamination: Option<f64>,
    remove_outliers: Option<bool>,
    n_estimators: Option<usize>,
    max_samples: Option<usize>,
    random_state: Option<u64>,
}

impl CleaningConfigBuilder {
    /// Set the columns screened by the outlier detector.
    pub fn outlier_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outlier_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the expected fraction of anomalous rows.
    ///
    /// # Arguments
    /// * `contamination` - Value in `(0.0, 0.5]` (e.g., 0.05 = 5%)
    pub fn contamination(mut self, contamination: f64) -> Self {
        self.contamination = Some(contamination);
        self
    }

    /// Enable or disable outlier removal.
    pub fn remove_outliers(mut self, remove: bool) -> Self {
        self.remove_outliers = Some(remove);
        self
    }

    /// Set the number of isolation trees.
    pub fn n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = Some(n);
        self
    }

    /// Set the per-tree subsample size.
    pub fn max_samples(mut self, n: usize) -> Self {
        self.max_samples = Some(n);
        self
    }

    /// Set the detector seed.
    pub fn random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let defaults = DetectorConfig::default();
        let config = CleaningConfig {
            outlier_columns: self
                .outlier_columns
                .unwrap_or_else(|| vec!["price".to_string()]),
            contamination: self.contamination.unwrap_or(DEFAULT_CONTAMINATION),
            remove_outliers: self.remove_outliers.unwrap_or(true),
            detector: DetectorConfig {
                n_estimators: self.n_estimators.unwrap_or(defaults.n_estimators),
                max_samples: self.max_samples.unwrap_or(defaults.max_samples),
                random_state: self.random_state.unwrap_or(defaults.random_state),
            },
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CleaningConfig::default();
        assert_eq!(config.outlier_columns, vec!["price".to_string()]);
        assert_eq!(config.contamination, 0.05);
        assert!(config.remove_outliers);
        assert_eq!(config.detector.random_state, 42);
        assert_eq!(config.detector.n_estimators, 100);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = CleaningConfig::builder()
            .outlier_columns(["price", "sqft"])
            .contamination(0.1)
            .random_state(7)
            .n_estimators(50)
            .build()
            .unwrap();

        assert_eq!(config.outlier_columns, vec!["price", "sqft"]);
        assert_eq!(config.contamination, 0.1);
        assert_eq!(config.detector.random_state, 7);
        assert_eq!(config.detector.n_estimators, 50);
        assert_eq!(config.detector.max_samples, 256);
    }

    #[test]
    fn test_validation_invalid_contamination() {
        for bad in [0.0, -0.1, 0.6, f64::NAN] {
            let result = CleaningConfig::builder().contamination(bad).build();
            assert!(matches!(
                result.unwrap_err(),
                ConfigValidationError::InvalidContamination(_)
            ));
        }
        assert!(CleaningConfig::builder().contamination(0.5).build().is_ok());
    }

    #[test]
    fn test_validation_empty_outlier_columns() {
        let result = CleaningConfig::builder()
            .outlier_columns(Vec::<String>::new())
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::NoOutlierColumns
        ));

        // Allowed when the filter is switched off
        let config = CleaningConfig::builder()
            .outlier_columns(Vec::<String>::new())
            .remove_outliers(false)
            .build();
        assert!(config.is_ok());
    }

    #[test]
    fn test_validation_zero_estimators() {
        let result = CleaningConfig::builder().n_estimators(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidCount { .. }
        ));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "outlier_columns": ["price"],
            "contamination": 0.02,
            "remove_outliers": true,
            "detector": { "n_estimators": 200, "max_samples": 128, "random_state": 1 }
        }"#;

        let config: CleaningConfig = serde_json::from_str(json).expect("valid JSON config");
        assert_eq!(config.contamination, 0.02);
        assert_eq!(config.detector.n_estimators, 200);
        assert_eq!(config.detector.max_samples, 128);
        assert!(config.validate().is_ok());
    }
}
