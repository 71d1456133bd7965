//! Data cleaning module for raw house sale records.
//!
//! This module provides functionality for:
//! - Filling missing values per column (median or mode)
//! - Removing anomalous rows with the outlier filter

use crate::config::CleaningConfig;
use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::outliers::OutlierFilter;
use crate::types::{CleanedDataset, CleaningSummary};
use crate::utils::missing_count;
use polars::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Data cleaner that turns a raw dataset into a training-ready one.
#[derive(Debug, Clone)]
pub struct DataCleaner {
    config: CleaningConfig,
    outlier_filter: OutlierFilter,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(CleaningConfig::default())
    }
}

impl DataCleaner {
    pub fn new(config: CleaningConfig) -> Self {
        let outlier_filter = OutlierFilter::from_config(&config.detector);
        Self {
            config,
            outlier_filter,
        }
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Clean a dataset.
    ///
    /// This includes:
    /// 1. Filling missing values column by column
    /// 2. Removing outlier rows on the configured columns (unless disabled)
    ///
    /// Nulls and NaN both count as missing. The input frame is never modified.
    pub fn clean(&self, df: &DataFrame) -> Result<CleanedDataset> {
        self.config.validate()?;

        let start = Instant::now();
        let mut summary = CleaningSummary::new();
        let mut data = df.clone();

        summary.rows_before = data.height();
        summary.columns = data.width();
        summary.missing_before = data
            .get_columns()
            .iter()
            .map(|c| missing_count(c.as_materialized_series()))
            .sum();

        info!(
            "Cleaning {} rows x {} columns ({} missing values)",
            summary.rows_before, summary.columns, summary.missing_before
        );

        let col_names: Vec<String> = data
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for col_name in &col_names {
            if let Some(record) =
                StatisticalImputer::impute_column(&mut data, col_name, &mut summary.processing_steps)?
            {
                summary.imputations.push(record);
            }
        }

        if summary.imputations.is_empty() {
            summary
                .processing_steps
                .push("No missing values found".to_string());
            debug!("No missing values found");
        }

        if self.config.remove_outliers {
            let outcome = self
                .outlier_filter
                .filter(&data, &self.config.outlier_columns, self.config.contamination)
                .context("While removing outliers")?;

            summary.processing_steps.push(format!(
                "Removed {} outlier rows using {:?}",
                outcome.report.rows_removed, outcome.report.columns
            ));
            data = outcome.data;
            summary.outliers = Some(outcome.report);
        } else {
            summary
                .processing_steps
                .push("Outlier removal skipped".to_string());
        }

        summary.rows_after = data.height();
        summary.rows_removed = summary.rows_before - summary.rows_after;
        summary.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Cleaning complete: {} -> {} rows in {} ms",
            summary.rows_before, summary.rows_after, summary.duration_ms
        );

        Ok(CleanedDataset { data, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use crate::types::ImputationStrategy;

    fn no_outliers() -> CleaningConfig {
        CleaningConfig::builder()
            .remove_outliers(false)
            .build()
            .unwrap()
    }

    fn raw_df() -> DataFrame {
        df![
            "sqft" => [Some(1500.0), None, Some(2100.0), Some(1800.0)],
            "bedrooms" => [Some(3i64), Some(2), None, Some(4)],
            "location" => [Some("Urban"), None, Some("Rural"), Some("Urban")],
            "price" => [300_000.0, 250_000.0, 410_000.0, 380_000.0],
        ]
        .unwrap()
    }

    #[test]
    fn test_clean_fills_every_missing_value() {
        let cleaner = DataCleaner::new(no_outliers());
        let cleaned = cleaner.clean(&raw_df()).unwrap();

        let total_nulls: usize = cleaned
            .data
            .get_columns()
            .iter()
            .map(|c| c.null_count())
            .sum();
        assert_eq!(total_nulls, 0);
        assert_eq!(cleaned.summary.missing_before, 3);
        assert_eq!(cleaned.summary.imputations.len(), 3);
        assert_eq!(cleaned.shape(), (4, 4));
        assert!(cleaned.summary.outliers.is_none());
    }

    #[test]
    fn test_clean_picks_strategy_per_column() {
        let cleaned = DataCleaner::new(no_outliers()).clean(&raw_df()).unwrap();

        let by_column = |name: &str| {
            cleaned
                .summary
                .imputations
                .iter()
                .find(|r| r.column == name)
                .unwrap()
                .clone()
        };
        assert_eq!(by_column("sqft").strategy, ImputationStrategy::Median);
        assert_eq!(by_column("sqft").fill_value, "1800");
        assert_eq!(by_column("bedrooms").fill_value, "3");
        assert_eq!(by_column("location").strategy, ImputationStrategy::Mode);
        assert_eq!(by_column("location").fill_value, "Urban");
    }

    #[test]
    fn test_clean_does_not_touch_input() {
        let df = raw_df();
        DataCleaner::new(no_outliers()).clean(&df).unwrap();
        assert_eq!(df.column("sqft").unwrap().null_count(), 1);
    }

    #[test]
    fn test_clean_empty_column_fails() {
        let df = df![
            "price" => [1.0, 2.0, 3.0],
            "lot_size" => [Option::<f64>::None, None, None],
        ]
        .unwrap();

        let err = DataCleaner::new(no_outliers()).clean(&df).unwrap_err();
        assert!(matches!(err, ProcessingError::EmptyColumn(ref c) if c == "lot_size"));
    }

    #[test]
    fn test_clean_runs_outlier_filter() {
        let mut prices: Vec<f64> = (0..199).map(|i| 250_000.0 + (i * 500) as f64).collect();
        prices.push(40_000_000.0);
        let df = df!["price" => prices].unwrap();

        let config = CleaningConfig::builder()
            .contamination(0.01)
            .build()
            .unwrap();
        let cleaned = DataCleaner::new(config).clean(&df).unwrap();

        let report = cleaned.summary.outliers.as_ref().unwrap();
        assert_eq!(report.rows_removed, cleaned.summary.rows_removed);
        assert_eq!(cleaned.summary.rows_after, cleaned.data.height());
        assert!(report.rows_removed >= 1 && report.rows_removed <= 3);
    }

    #[test]
    fn test_clean_imputes_nan_before_outlier_filter() {
        let mut prices: Vec<f64> = (0..99).map(|i| 250_000.0 + (i * 1_000) as f64).collect();
        prices.push(f64::NAN);
        let df = df!["price" => prices].unwrap();

        let config = CleaningConfig::builder()
            .contamination(0.05)
            .build()
            .unwrap();
        let cleaned = DataCleaner::new(config).clean(&df).unwrap();

        assert_eq!(cleaned.summary.missing_before, 1);
        assert_eq!(cleaned.summary.imputations.len(), 1);
        let price = cleaned.data.column("price").unwrap().as_materialized_series();
        assert_eq!(price.null_count(), 0);
        assert!(price.f64().unwrap().into_iter().flatten().all(f64::is_finite));
    }

    #[test]
    fn test_clean_date_column_with_nulls_is_unsupported() {
        let sold_on = Series::new("sold_on".into(), &[Some(19_000i32), None, Some(19_010)])
            .cast(&DataType::Date)
            .unwrap();
        let mut df = df!["price" => [1.0, 2.0, 3.0]].unwrap();
        df.with_column(sold_on).unwrap();

        let err = DataCleaner::new(no_outliers()).clean(&df).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_COLUMN_TYPE");
    }

    #[test]
    fn test_clean_missing_outlier_column() {
        let df = df!["sqft" => [1.0, 2.0, 3.0]].unwrap();
        let err = DataCleaner::default().clean(&df).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }
}
