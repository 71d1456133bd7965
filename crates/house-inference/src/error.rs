//! Error types for the house-inference crate.
//!
//! This module defines [`InferenceError`], the main error type used throughout
//! the crate. All public API functions return [`Result<T>`].
//!
//! # Error Handling
//!
//! Errors fall into three groups that callers treat differently:
//! - **Model errors** ([`ModelNotFound`](InferenceError::ModelNotFound),
//!   [`ModelCorrupt`](InferenceError::ModelCorrupt),
//!   [`SchemaMismatch`](InferenceError::SchemaMismatch)) are raised while
//!   loading an artifact. A predictor that failed to load reports
//!   [`ModelUnavailable`](InferenceError::ModelUnavailable) on every call.
//! - **Input errors** ([`InvalidInput`](InferenceError::InvalidInput)) mean the
//!   request itself is bad and retrying it will not help.
//! - **Runtime errors** ([`InferenceFailed`](InferenceError::InferenceFailed),
//!   I/O, JSON, Polars) come from the regressor or the environment.
//!
//! # Example
//!
//! ```rust,ignore
//! use house_inference::{InferenceError, Predictor};
//!
//! match predictor.predict_price(&record) {
//!     Ok(response) => println!("{}", response.predicted_price),
//!     Err(e) if e.is_model_unavailable() => eprintln!("service degraded: {}", e),
//!     Err(e) if e.is_input_error() => eprintln!("bad request: {}", e),
//!     Err(e) => return Err(e),
//! }
//! ```

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for house-inference operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InferenceError {
    /// The predictor holds no usable model.
    ///
    /// Returned by every prediction call on a predictor whose model failed to
    /// load. The message carries the original load failure. Fixing the
    /// artifact and restarting resolves it.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// The model artifact does not exist.
    #[error("Model not found: {path}")]
    ModelNotFound {
        /// The path that was not found.
        path: String,
    },

    /// The model artifact exists but could not be parsed.
    #[error("Model artifact '{path}' is corrupt: {reason}")]
    ModelCorrupt {
        /// The artifact path.
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The artifact was trained on a different feature scheme.
    ///
    /// The encoder's columns and the regressor's inputs must match exactly,
    /// in name and order.
    #[error("Feature schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch {
        /// What the encoder produces.
        expected: String,
        /// What the artifact declares.
        found: String,
    },

    /// The request contains a value the encoder cannot accept.
    ///
    /// Common causes:
    /// - `sqft` is zero, negative or not finite
    /// - `bathrooms` is negative or not finite
    /// - `year_built` lies after the reference year
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration provided to the predictor.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The regressor returned unusable output.
    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polars error while reading batch input.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl InferenceError {
    /// Get a stable error code for machine consumers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            Self::ModelNotFound { .. } => "MODEL_NOT_FOUND",
            Self::ModelCorrupt { .. } => "MODEL_CORRUPT",
            Self::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InferenceFailed(_) => "INFERENCE_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
        }
    }

    /// Whether the predictor is running without a model.
    #[must_use]
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, Self::ModelUnavailable(_))
    }

    /// Whether the request itself was rejected.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Whether the error came from loading or validating a model artifact.
    #[must_use]
    pub fn is_model_error(&self) -> bool {
        matches!(
            self,
            Self::ModelNotFound { .. } | Self::ModelCorrupt { .. } | Self::SchemaMismatch { .. }
        )
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for InferenceError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("InferenceError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InferenceError::ModelNotFound {
            path: "models/missing.json".to_string(),
        };
        assert_eq!(err.to_string(), "Model not found: models/missing.json");

        let err = InferenceError::SchemaMismatch {
            expected: "onehot-v1".to_string(),
            found: "transformer-v1".to_string(),
        };
        assert!(err.to_string().contains("onehot-v1"));
        assert!(err.to_string().contains("transformer-v1"));
    }

    #[test]
    fn test_error_classification() {
        let unavailable = InferenceError::ModelUnavailable("not loaded".to_string());
        assert!(unavailable.is_model_unavailable());
        assert!(!unavailable.is_input_error());

        let input = InferenceError::InvalidInput("sqft must be positive".to_string());
        assert!(input.is_input_error());
        assert!(!input.is_model_unavailable());

        let corrupt = InferenceError::ModelCorrupt {
            path: "m.json".to_string(),
            reason: "truncated".to_string(),
        };
        assert!(corrupt.is_model_error());
        assert!(!corrupt.is_model_unavailable());
    }

    #[test]
    fn test_error_serialization() {
        let err = InferenceError::InvalidInput("bad".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "INVALID_INPUT");
        assert_eq!(json["message"], "Invalid input: bad");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: InferenceError = io_err.into();
        assert!(matches!(err, InferenceError::Io(_)));
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
