//! Outlier filtering.
//!
//! Screens whole rows with an [`AnomalyDetector`] fitted on a subset of numeric
//! columns and keeps only the rows labelled normal. Surviving rows are passed
//! through unmodified.

use crate::config::{DetectorConfig, validate_contamination};
use crate::detectors::{AnomalyDetector, AnomalyLabel, IsolationForest};
use crate::error::{ProcessingError, Result, ResultExt};
use crate::types::{FilterOutcome, OutlierReport};
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use tracing::{debug, info};

/// Removes anomalous rows from a dataset.
#[derive(Debug, Clone, Default)]
pub struct OutlierFilter<D = IsolationForest> {
    detector: D,
}

impl OutlierFilter<IsolationForest> {
    /// Filter backed by an isolation forest with the given parameters.
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(IsolationForest::new(config.clone()))
    }
}

impl<D: AnomalyDetector> OutlierFilter<D> {
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Drop the rows the detector labels anomalous on `columns`.
    ///
    /// Removes roughly `contamination * rows` rows. Which rows depends on the
    /// whole dataset, so the result is only reproducible for identical input.
    pub fn filter(
        &self,
        df: &DataFrame,
        columns: &[String],
        contamination: f64,
    ) -> Result<FilterOutcome> {
        validate_contamination(contamination)?;
        if columns.is_empty() {
            return Err(ProcessingError::InvalidConfig(
                "outlier filter needs at least one column".to_string(),
            ));
        }

        let matrix = Self::feature_matrix(df, columns)?;
        let labels = self
            .detector
            .fit_predict(&matrix, contamination)
            .context("While detecting outliers")?;

        if labels.len() != df.height() {
            return Err(ProcessingError::DetectorFailed(format!(
                "detector returned {} labels for {} rows",
                labels.len(),
                df.height()
            )));
        }

        let mask_values: Vec<bool> = labels.iter().map(AnomalyLabel::is_normal).collect();
        let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
        let data = df.filter(&mask)?;

        let rows_removed = df.height() - data.height();
        let shape_after = data.shape();
        info!(
            "Removed {} outlier rows using {:?}; data shape is now {:?}",
            rows_removed, columns, shape_after
        );

        Ok(FilterOutcome {
            data,
            report: OutlierReport {
                columns: columns.to_vec(),
                contamination,
                rows_removed,
                shape_after,
            },
        })
    }

    /// Row-major `f64` matrix over `columns`.
    fn feature_matrix(df: &DataFrame, columns: &[String]) -> Result<Vec<Vec<f64>>> {
        let mut matrix: Vec<Vec<f64>> = (0..df.height())
            .map(|_| Vec::with_capacity(columns.len()))
            .collect();

        for col_name in columns {
            let series = df
                .column(col_name)
                .map_err(|_| ProcessingError::ColumnNotFound(col_name.clone()))?
                .as_materialized_series();

            if !is_numeric_dtype(series.dtype()) {
                return Err(ProcessingError::UnsupportedColumnType {
                    column: col_name.clone(),
                    dtype: format!("{:?}", series.dtype()),
                    operation: "outlier detection".to_string(),
                });
            }
            if series.null_count() > 0 {
                return Err(ProcessingError::NoValidValues(col_name.clone()));
            }

            let as_float = series.cast(&DataType::Float64)?;
            for (row, value) in matrix.iter_mut().zip(as_float.f64()?.into_iter()) {
                row.push(value.ok_or_else(|| ProcessingError::NoValidValues(col_name.clone()))?);
            }
        }

        debug!(
            "Built {}x{} outlier matrix",
            matrix.len(),
            columns.len()
        );
        Ok(matrix)
    }
}
