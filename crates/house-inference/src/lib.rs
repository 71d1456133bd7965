//! house-inference: feature encoding and price prediction for houses.
//!
//! This crate turns raw house attributes into the model's feature vector and
//! serves predictions from a trained regressor.
//!
//! # Features
//!
//! - **Frozen feature scheme**: [`FeatureEncoder`] implements the versioned
//!   `onehot-v1` encoding with an injected reference year
//! - **Explicit model state**: a [`Predictor`] whose model failed to load
//!   rejects every call with [`InferenceError::ModelUnavailable`] instead of
//!   guessing a price
//! - **Pluggable regressors**: anything implementing [`Regressor`]; the
//!   reference [`LinearModel`] artifact is plain JSON checked against the
//!   encoder at load time
//! - **Batch input**: [`RawHouseRecord::from_dataframe`] reads records from a
//!   Polars `DataFrame`
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use house_inference::{Predictor, PredictorConfig, RawHouseRecord};
//!
//! let config = PredictorConfig::builder()
//!     .model_path("models/trained/house_price_model.json")
//!     .reference_year(2025)
//!     .build()?;
//!
//! // Never fails; check availability or handle ModelUnavailable per call
//! let predictor = Predictor::load(&config);
//!
//! let record = RawHouseRecord::new(2000.0, 3, 2.0, "Urban", 2000, "Good");
//! let response = predictor.predict_price(&record)?;
//! println!("{}", serde_json::to_string_pretty(&response)?);
//!
//! let prices = predictor.batch_predict(&[record.clone(), record])?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! RawHouseRecord ──► FeatureEncoder ──► FeatureMatrix ──► Regressor ──► PredictionResponse
//!                    (onehot-v1,                          (ModelState:
//!                     reference year)                      Ready | Unavailable)
//! ```
//!
//! # Thread Safety
//!
//! [`Predictor`] is `Send + Sync`. The regressor is shared behind an `Arc` and
//! is never mutated after load, so one predictor can serve many threads.

pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod predictor;
pub mod types;

pub use config::{PredictorConfig, PredictorConfigBuilder};
pub use error::{InferenceError, Result};
pub use features::{FEATURE_NAMES, FeatureEncoder, FeatureMatrix, FeatureVector, SCHEME_VERSION};
pub use model::{LinearModel, ModelState, Regressor};
pub use predictor::Predictor;
pub use types::{PredictionResponse, RawHouseRecord};

static_assertions::assert_impl_all!(Predictor: Send, Sync);
static_assertions::assert_impl_all!(ModelState: Send, Sync);
static_assertions::assert_impl_all!(LinearModel: Regressor);
