//! Feature encoding for the price model.
//!
//! [`FeatureEncoder`] turns a [`RawHouseRecord`] into the exact numeric vector
//! the regressor was trained on. The scheme is frozen and versioned as
//! [`SCHEME_VERSION`]; training and inference must use the same version and
//! the same reference year.
//!
//! # Scheme `onehot-v1`
//!
//! | # | feature | rule |
//! |---|---------|------|
//! | 0 | `sqft` | passthrough |
//! | 1 | `bedrooms` | passthrough |
//! | 2 | `bathrooms` | passthrough |
//! | 3 | `house_age` | `reference_year - year_built` |
//! | 4 | `bed_bath_ratio` | `bedrooms / bathrooms`, `0` when `bathrooms == 0` |
//! | 5 | `location_urban` | 1 if location is `urban` |
//! | 6 | `location_suburban` | 1 if location is `suburban` |
//! | 7 | `location_rural` | 1 if location is `rural` |
//! | 8 | `condition_good` | 1 if condition is `good` |
//! | 9 | `condition_excellent` | 1 if condition is `excellent` |
//!
//! Categories are trimmed and compared case-insensitively. Any other value
//! (`waterfront`, `fair`, ...) leaves every indicator of its group at 0.

use crate::error::{InferenceError, Result};
use crate::types::RawHouseRecord;
use chrono::{Datelike, Utc};
use polars::prelude::*;
use tracing::warn;

/// Version tag of the encoding implemented here.
pub const SCHEME_VERSION: &str = "onehot-v1";

/// Number of features in one encoded vector.
pub const FEATURE_COUNT: usize = 10;

/// Column names in encoding order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "sqft",
    "bedrooms",
    "bathrooms",
    "house_age",
    "bed_bath_ratio",
    "location_urban",
    "location_suburban",
    "location_rural",
    "condition_good",
    "condition_excellent",
];

const LOCATIONS: [&str; 3] = ["urban", "suburban", "rural"];
const CONDITIONS: [&str; 2] = ["good", "excellent"];

/// One encoded record, ordered as [`FEATURE_NAMES`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of the named feature, if the scheme has it.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.0[i])
    }
}

/// Row-major batch of encoded records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureMatrix {
    rows: Vec<FeatureVector>,
}

impl FeatureMatrix {
    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }

    /// One `Float64` column per feature, in scheme order.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = FEATURE_NAMES
            .iter()
            .enumerate()
            .map(|(j, name)| {
                let values: Vec<f64> = self.rows.iter().map(|row| row.0[j]).collect();
                Column::new((*name).into(), values)
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

impl From<Vec<FeatureVector>> for FeatureMatrix {
    fn from(rows: Vec<FeatureVector>) -> Self {
        Self { rows }
    }
}

/// Encoder for the `onehot-v1` scheme.
///
/// Pure: the same record and reference year always give the same vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureEncoder {
    reference_year: i32,
}

impl FeatureEncoder {
    /// Encoder computing `house_age` against `reference_year`.
    pub fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    /// Encoder pinned to the current calendar year.
    ///
    /// The year is read once. A model trained in an earlier year sees
    /// every house one year older per year of drift, so prefer
    /// [`FeatureEncoder::new`] with the training year.
    pub fn from_current_year() -> Self {
        let year = Utc::now().year();
        warn!(
            "Using current year {} as reference year; house_age drifts unless it matches the training year",
            year
        );
        Self::new(year)
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Encode one record.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::InvalidInput`] if `sqft` is not a positive
    /// finite number, `bathrooms` is negative or not finite, or `year_built`
    /// lies after the reference year.
    pub fn encode(&self, record: &RawHouseRecord) -> Result<FeatureVector> {
        self.validate(record)?;

        let bedrooms = f64::from(record.bedrooms);
        let bed_bath_ratio = if record.bathrooms == 0.0 {
            0.0
        } else {
            bedrooms / record.bathrooms
        };

        let location = normalize_category(&record.location);
        let condition = normalize_category(&record.condition);
        let indicator = |value: &str, category: &str| if value == category { 1.0 } else { 0.0 };

        Ok(FeatureVector([
            record.sqft,
            bedrooms,
            record.bathrooms,
            f64::from(self.reference_year) - f64::from(record.year_built),
            bed_bath_ratio,
            indicator(&location, LOCATIONS[0]),
            indicator(&location, LOCATIONS[1]),
            indicator(&location, LOCATIONS[2]),
            indicator(&condition, CONDITIONS[0]),
            indicator(&condition, CONDITIONS[1]),
        ]))
    }

    /// Encode a batch with the same rules, one row per record.
    ///
    /// Fails on the first invalid record; the error names its index.
    pub fn encode_batch(&self, records: &[RawHouseRecord]) -> Result<FeatureMatrix> {
        records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                self.encode(record).map_err(|e| match e {
                    InferenceError::InvalidInput(msg) => {
                        InferenceError::InvalidInput(format!("record {}: {}", i, msg))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(FeatureMatrix::from)
    }

    fn validate(&self, record: &RawHouseRecord) -> Result<()> {
        if !record.sqft.is_finite() || record.sqft <= 0.0 {
            return Err(InferenceError::InvalidInput(format!(
                "sqft must be a positive number, got {}",
                record.sqft
            )));
        }
        if !record.bathrooms.is_finite() || record.bathrooms < 0.0 {
            return Err(InferenceError::InvalidInput(format!(
                "bathrooms must be zero or more, got {}",
                record.bathrooms
            )));
        }
        if record.year_built > self.reference_year {
            return Err(InferenceError::InvalidInput(format!(
                "year_built {} is after reference year {}",
                record.year_built, self.reference_year
            )));
        }
        Ok(())
    }
}

fn normalize_category(value: &str) -> String {
    value.trim().to_lowercase()
}
