//! Request and response types.
//!
//! - [`RawHouseRecord`]: one house as submitted for prediction
//! - [`PredictionResponse`]: result of [`Predictor::predict_price()`](crate::Predictor::predict_price)

use crate::error::{InferenceError, Result};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw attributes of one house.
///
/// Category fields are free text; the encoder compares them case-insensitively
/// and maps unknown values to "none of the above".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHouseRecord {
    /// Living area in square feet. Must be positive.
    pub sqft: f64,
    pub bedrooms: u32,
    /// May be zero (e.g. a studio); must not be negative.
    pub bathrooms: f64,
    /// `urban`, `suburban` or `rural`.
    pub location: String,
    pub year_built: i32,
    /// `good` or `excellent`; anything else is treated as neither.
    pub condition: String,
}

impl RawHouseRecord {
    pub fn new(
        sqft: f64,
        bedrooms: u32,
        bathrooms: f64,
        location: impl Into<String>,
        year_built: i32,
        condition: impl Into<String>,
    ) -> Self {
        Self {
            sqft,
            bedrooms,
            bathrooms,
            location: location.into(),
            year_built,
            condition: condition.into(),
        }
    }

    /// Read one record per row from a frame with the six record columns.
    ///
    /// Extra columns are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::InvalidInput`] if a column is missing, has
    /// the wrong type, contains nulls, or holds a count that is negative or
    /// fractional.
    pub fn from_dataframe(df: &DataFrame) -> Result<Vec<Self>> {
        let sqft = numeric_column(df, "sqft")?;
        let bedrooms = numeric_column(df, "bedrooms")?;
        let bathrooms = numeric_column(df, "bathrooms")?;
        let location = text_column(df, "location")?;
        let year_built = numeric_column(df, "year_built")?;
        let condition = text_column(df, "condition")?;

        (0..df.height())
            .map(|i| {
                Ok(Self {
                    sqft: sqft[i],
                    bedrooms: whole_number(bedrooms[i], "bedrooms", i)?,
                    bathrooms: bathrooms[i],
                    location: location[i].clone(),
                    year_built: whole_number(year_built[i], "year_built", i)?,
                    condition: condition[i].clone(),
                })
            })
            .collect()
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    let series = df
        .column(name)
        .map_err(|_| InferenceError::InvalidInput(format!("missing column '{}'", name)))?
        .as_materialized_series();

    if series.null_count() > 0 {
        return Err(InferenceError::InvalidInput(format!(
            "column '{}' has {} missing values",
            name,
            series.null_count()
        )));
    }
    Ok(series)
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = column(df, name)?;
    if matches!(series.dtype(), DataType::String | DataType::Boolean) {
        return Err(InferenceError::InvalidInput(format!(
            "column '{}' must be numeric, found {:?}",
            name,
            series.dtype()
        )));
    }

    let as_float = series.cast(&DataType::Float64).map_err(|_| {
        InferenceError::InvalidInput(format!("column '{}' must be numeric", name))
    })?;
    Ok(as_float.f64()?.into_no_null_iter().collect())
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let series = column(df, name)?;
    let as_str = series.cast(&DataType::String)?;
    Ok(as_str
        .str()?
        .into_no_null_iter()
        .map(str::to_string)
        .collect())
}

fn whole_number<T: TryFrom<i64>>(value: f64, name: &str, row: usize) -> Result<T> {
    let invalid = || {
        InferenceError::InvalidInput(format!(
            "row {}: '{}' must be a whole number in range, got {}",
            row, name, value
        ))
    };
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(invalid());
    }
    T::try_from(value as i64).map_err(|_| invalid())
}

/// Result of a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Predicted price rounded to 2 decimals.
    pub predicted_price: f64,

    /// `[low, high]`, a fixed ±10% band around the prediction.
    ///
    /// This is a display heuristic, not a statistical interval.
    pub confidence_interval: [f64; 2],

    /// Feature name → weight. Informational only.
    pub features_importance: BTreeMap<String, f64>,

    pub prediction_time: DateTime<Utc>,
}
