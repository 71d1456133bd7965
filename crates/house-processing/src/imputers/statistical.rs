//! Statistical imputation methods.
//!
//! Median for numeric columns, mode for categorical and boolean columns. Each
//! statistic is computed over the non-missing values of that column only.

use crate::error::{ProcessingError, Result};
use crate::types::{ImputationRecord, ImputationStrategy};
use crate::utils::{
    DtypeCategory, bool_mode, fill_bool_nulls, fill_numeric_nulls, fill_string_nulls,
    nan_to_null, series_dtype_category, string_mode,
};
use polars::prelude::*;
use tracing::{debug, info};

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Impute one column according to its dtype.
    ///
    /// Nulls and floating-point NaN both count as missing. Returns `Ok(None)`
    /// when the column has no missing values.
    pub fn impute_column(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<Option<ImputationRecord>> {
        let series = Self::series_nan_as_null(df, col_name)?;
        if series.null_count() == 0 {
            return Ok(None);
        }

        match series_dtype_category(&series) {
            DtypeCategory::Numeric => Self::apply_numeric_median(df, col_name, processing_steps),
            DtypeCategory::String => Self::apply_mode_imputation(df, col_name, processing_steps),
            DtypeCategory::Boolean => Self::apply_boolean_mode(df, col_name, processing_steps),
            DtypeCategory::Other => Err(ProcessingError::UnsupportedColumnType {
                column: col_name.to_string(),
                dtype: format!("{:?}", series.dtype()),
                operation: "imputation".to_string(),
            }),
        }
    }

    /// Apply median imputation for numeric columns.
    ///
    /// NaN values are filled too and never contribute to the median.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<Option<ImputationRecord>> {
        let series = Self::series_nan_as_null(df, col_name)?;
        let missing_count = series.null_count();
        if missing_count == 0 {
            return Ok(None);
        }

        let median_val = series
            .median()
            .ok_or_else(|| ProcessingError::EmptyColumn(col_name.to_string()))?;

        let filled = fill_numeric_nulls(&series, median_val)?;
        df.replace(col_name, filled)?;

        info!(
            "Filled {} missing values in {} with median: {}",
            missing_count, col_name, median_val
        );
        processing_steps.push(format!(
            "Filled '{}' with median: {:.2}",
            col_name, median_val
        ));

        Ok(Some(ImputationRecord {
            column: col_name.to_string(),
            missing_count,
            strategy: ImputationStrategy::Median,
            fill_value: median_val.to_string(),
        }))
    }

    /// Apply mode imputation for categorical columns.
    pub fn apply_mode_imputation(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<Option<ImputationRecord>> {
        let series = Self::series(df, col_name)?;
        let missing_count = series.null_count();
        if missing_count == 0 {
            return Ok(None);
        }

        let mode_val = string_mode(&series)
            .ok_or_else(|| ProcessingError::EmptyColumn(col_name.to_string()))?;

        let filled = fill_string_nulls(&series, &mode_val)?;
        df.replace(col_name, filled)?;

        info!(
            "Filled {} missing values in {} with mode: {}",
            missing_count, col_name, mode_val
        );
        processing_steps.push(format!("Filled '{}' with mode: '{}'", col_name, mode_val));

        Ok(Some(ImputationRecord {
            column: col_name.to_string(),
            missing_count,
            strategy: ImputationStrategy::Mode,
            fill_value: mode_val,
        }))
    }

    /// Apply mode imputation for boolean columns.
    pub fn apply_boolean_mode(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<Option<ImputationRecord>> {
        let series = Self::series(df, col_name)?;
        let missing_count = series.null_count();
        if missing_count == 0 {
            return Ok(None);
        }

        let mode_val = bool_mode(&series)
            .ok_or_else(|| ProcessingError::EmptyColumn(col_name.to_string()))?;

        let filled = fill_bool_nulls(&series, mode_val)?;
        df.replace(col_name, filled)?;

        info!(
            "Filled {} missing values in {} with mode: {}",
            missing_count, col_name, mode_val
        );
        processing_steps.push(format!("Filled '{}' with mode: {}", col_name, mode_val));

        Ok(Some(ImputationRecord {
            column: col_name.to_string(),
            missing_count,
            strategy: ImputationStrategy::Mode,
            fill_value: mode_val.to_string(),
        }))
    }

    fn series(df: &DataFrame, col_name: &str) -> Result<Series> {
        df.column(col_name)
            .map(|col| col.as_materialized_series().clone())
            .map_err(|_| ProcessingError::ColumnNotFound(col_name.to_string()))
    }
    /// The column with NaN turned into null, written back when anything changed.
    fn series_nan_as_null(df: &mut DataFrame, col_name: &str) -> Result<Series> {
        let series = Self::series(df, col_name)?;
        let cleaned = nan_to_null(&series)?;
        if cleaned.null_count() == series.null_count() {
            return Ok(series);
        }

        debug!(
            "Treating {} NaN values in {} as missing",
            cleaned.null_count() - series.null_count(),
            col_name
        );
        df.replace(col_name, cleaned.clone())?;
        Ok(cleaned)
    }
}
