//! Price prediction service.
//!
//! [`Predictor`] owns a [`FeatureEncoder`] and a [`ModelState`]. It never
//! invents a price: when the model is unavailable every call returns
//! [`InferenceError::ModelUnavailable`].
//!
//! # Example
//!
//! ```rust,ignore
//! use house_inference::{Predictor, PredictorConfig, RawHouseRecord};
//!
//! let config = PredictorConfig::builder()
//!     .model_path("models/trained/house_price_model.json")
//!     .reference_year(2025)
//!     .build()?;
//! let predictor = Predictor::load(&config);
//!
//! let record = RawHouseRecord::new(2000.0, 3, 2.0, "Urban", 2000, "Good");
//! let response = predictor.predict_price(&record)?;
//! println!("{} {:?}", response.predicted_price, response.confidence_interval);
//! ```

use crate::config::PredictorConfig;
use crate::error::{InferenceError, Result};
use crate::features::{FeatureEncoder, FeatureMatrix};
use crate::model::{ModelState, Regressor};
use crate::types::{PredictionResponse, RawHouseRecord};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Lower and upper multipliers of the heuristic confidence band.
const BAND: (f64, f64) = (0.9, 1.1);

/// Informational weights reported when the model has none of its own.
const STATIC_IMPORTANCE: [(&str, f64); 4] = [
    ("sqft", 0.4),
    ("age", 0.3),
    ("bedrooms", 0.2),
    ("bathrooms", 0.1),
];

/// Encodes records and runs them through the loaded regressor.
#[derive(Debug, Clone)]
pub struct Predictor {
    encoder: FeatureEncoder,
    state: ModelState,
}

impl Predictor {
    pub fn new(encoder: FeatureEncoder, state: ModelState) -> Self {
        Self { encoder, state }
    }

    /// Predictor serving an in-memory regressor.
    pub fn with_regressor(encoder: FeatureEncoder, regressor: Arc<dyn Regressor>) -> Self {
        Self::new(encoder, ModelState::Ready(regressor))
    }

    /// Predictor that rejects every call with `reason`.
    pub fn unavailable(encoder: FeatureEncoder, reason: impl Into<String>) -> Self {
        Self::new(
            encoder,
            ModelState::Unavailable {
                reason: reason.into(),
            },
        )
    }

    /// Load the artifact named by `config`.
    ///
    /// Never fails. If the artifact is missing, corrupt or built for another
    /// feature scheme, the error is logged and the predictor starts in the
    /// unavailable state.
    pub fn load(config: &PredictorConfig) -> Self {
        let encoder = match config.reference_year {
            Some(year) => FeatureEncoder::new(year),
            None => FeatureEncoder::from_current_year(),
        };
        let state = ModelState::load_linear(&config.model_path);
        if state.is_ready() {
            info!(
                "Predictor ready (model {}, reference year {})",
                config.model_path.display(),
                encoder.reference_year()
            );
        }
        Self::new(encoder, state)
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state.is_ready()
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    /// Predict the price of one house.
    ///
    /// The price is rounded to 2 decimals and wrapped in a fixed ±10% band.
    ///
    /// # Errors
    ///
    /// - [`InferenceError::ModelUnavailable`] if no model is loaded
    /// - [`InferenceError::InvalidInput`] if the record cannot be encoded
    /// - [`InferenceError::InferenceFailed`] if the regressor output is unusable
    pub fn predict_price(&self, record: &RawHouseRecord) -> Result<PredictionResponse> {
        let regressor = self.state.regressor()?;

        let vector = self.encoder.encode(record)?;
        let outputs = Self::run(regressor.as_ref(), &FeatureMatrix::from(vec![vector]))?;
        let price = round2(outputs[0]);

        debug!("Predicted price {} for {:?}", price, record);

        Ok(PredictionResponse {
            predicted_price: price,
            confidence_interval: confidence_band(price),
            features_importance: regressor
                .feature_importance()
                .unwrap_or_else(static_importance),
            prediction_time: Utc::now(),
        })
    }

    /// Raw regressor outputs for a batch, one per record.
    ///
    /// No rounding and no band. An empty batch returns an empty vector, but
    /// still fails if no model is loaded.
    pub fn batch_predict(&self, records: &[RawHouseRecord]) -> Result<Vec<f64>> {
        let regressor = self.state.regressor()?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let matrix = self.encoder.encode_batch(records)?;
        let outputs = Self::run(regressor.as_ref(), &matrix)?;

        info!("Predicted {} prices", outputs.len());
        Ok(outputs)
    }

    fn run(regressor: &dyn Regressor, matrix: &FeatureMatrix) -> Result<Vec<f64>> {
        let outputs = regressor.predict(matrix)?;
        if outputs.len() != matrix.n_rows() {
            return Err(InferenceError::InferenceFailed(format!(
                "regressor returned {} outputs for {} rows",
                outputs.len(),
                matrix.n_rows()
            )));
        }
        if let Some(i) = outputs.iter().position(|v| !v.is_finite()) {
            return Err(InferenceError::InferenceFailed(format!(
                "regressor returned a non-finite value for row {}",
                i
            )));
        }
        Ok(outputs)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `[round2(0.9·p), round2(1.1·p)]`.
fn confidence_band(price: f64) -> [f64; 2] {
    [round2(price * BAND.0), round2(price * BAND.1)]
}

fn static_importance() -> BTreeMap<String, f64> {
    STATIC_IMPORTANCE
        .iter()
        .map(|(name, weight)| (name.to_string(), *weight))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinearModel;
    use pretty_assertions::assert_eq;

    /// Returns a fixed value per row.
    #[derive(Debug)]
    struct ConstantRegressor(f64);

    impl Regressor for ConstantRegressor {
        fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
            Ok(vec![self.0; features.n_rows()])
        }
    }

    /// Returns one output regardless of the batch size.
    #[derive(Debug)]
    struct SingleOutputRegressor;

    impl Regressor for SingleOutputRegressor {
        fn predict(&self, _: &FeatureMatrix) -> Result<Vec<f64>> {
            Ok(vec![1.0])
        }
    }

    #[derive(Debug)]
    struct ImportanceRegressor;

    impl Regressor for ImportanceRegressor {
        fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
            Ok(vec![100.0; features.n_rows()])
        }

        fn feature_importance(&self) -> Option<BTreeMap<String, f64>> {
            Some(BTreeMap::from([("sqft".to_string(), 1.0)]))
        }
    }

    fn predictor(regressor: impl Regressor + 'static) -> Predictor {
        Predictor::with_regressor(FeatureEncoder::new(2025), Arc::new(regressor))
    }

    fn example() -> RawHouseRecord {
        RawHouseRecord::new(2000.0, 3, 2.0, "Urban", 2000, "Good")
    }

    #[test]
    fn test_predict_price_rounds_and_bands() {
        let response = predictor(ConstantRegressor(412_345.678))
            .predict_price(&example())
            .unwrap();

        assert_eq!(response.predicted_price, 412_345.68);
        assert_eq!(
            response.confidence_interval,
            [round2(412_345.68 * 0.9), round2(412_345.68 * 1.1)]
        );
        assert!(response.confidence_interval[0] <= response.predicted_price);
        assert!(response.predicted_price <= response.confidence_interval[1]);
    }

    #[test]
    fn test_static_importance_by_default() {
        let response = predictor(ConstantRegressor(1.0))
            .predict_price(&example())
            .unwrap();

        assert_eq!(response.features_importance.len(), 4);
        assert_eq!(response.features_importance["sqft"], 0.4);
        assert_eq!(response.features_importance["age"], 0.3);
        let total: f64 = response.features_importance.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_model_importance_overrides_static() {
        let response = predictor(ImportanceRegressor)
            .predict_price(&example())
            .unwrap();
        assert_eq!(
            response.features_importance,
            BTreeMap::from([("sqft".to_string(), 1.0)])
        );
    }

    #[test]
    fn test_batch_predict_returns_raw_outputs() {
        let outputs = predictor(ConstantRegressor(123.456))
            .batch_predict(&[example(), example()])
            .unwrap();
        assert_eq!(outputs, vec![123.456, 123.456]);
    }

    #[test]
    fn test_batch_predict_matches_linear_model() {
        let model = LinearModel::new(vec![100.0; 10], 5.0).unwrap();
        let p = predictor(model.clone());
        let records = vec![
            example(),
            RawHouseRecord::new(900.0, 1, 0.0, "Rural", 1960, "Fair"),
        ];

        let outputs = p.batch_predict(&records).unwrap();
        let expected = model
            .predict(&FeatureEncoder::new(2025).encode_batch(&records).unwrap())
            .unwrap();
        assert_eq!(outputs, expected);
    }

    #[test]
    fn test_unavailable_fails_every_call() {
        let p = Predictor::unavailable(FeatureEncoder::new(2025), "artifact missing");
        assert!(!p.is_available());

        let err = p.predict_price(&example()).unwrap_err();
        assert!(err.is_model_unavailable());
        assert!(err.to_string().contains("artifact missing"));

        assert!(p.batch_predict(&[example()]).unwrap_err().is_model_unavailable());
        assert!(p.batch_predict(&[]).unwrap_err().is_model_unavailable());
    }

    #[test]
    fn test_empty_batch_on_ready_predictor() {
        let outputs = predictor(ConstantRegressor(1.0)).batch_predict(&[]).unwrap();
        assert!(outputs.is_empty());
    }

    #[test]
    fn test_invalid_input_is_reported() {
        let mut record = example();
        record.sqft = -10.0;
        let err = predictor(ConstantRegressor(1.0))
            .predict_price(&record)
            .unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_output_length_mismatch() {
        let err = predictor(SingleOutputRegressor)
            .batch_predict(&[example(), example()])
            .unwrap_err();
        assert_eq!(err.error_code(), "INFERENCE_FAILED");
    }

    #[test]
    fn test_non_finite_output() {
        let err = predictor(ConstantRegressor(f64::NAN))
            .predict_price(&example())
            .unwrap_err();
        assert!(matches!(err, InferenceError::InferenceFailed(_)));
    }

    #[test]
    fn test_confidence_band_invariant() {
        for price in [0.0, 0.01, 99.99, 250_000.0, 1_234_567.89] {
            let [low, high] = confidence_band(price);
            assert_eq!(low, round2(price * 0.9));
            assert_eq!(high, round2(price * 1.1));
            assert!(low <= price && price <= high);
        }
    }
}
