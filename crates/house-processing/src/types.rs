//! Result types produced by the cleaning pipeline.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Statistic used to fill the missing values of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationStrategy {
    /// Median of the non-missing numeric values.
    Median,
    /// Most frequent non-missing value.
    Mode,
}

impl fmt::Display for ImputationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Median => write!(f, "median"),
            Self::Mode => write!(f, "mode"),
        }
    }
}

/// One column's imputation, as applied by the cleaner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationRecord {
    pub column: String,
    pub missing_count: usize,
    pub strategy: ImputationStrategy,
    /// The fill value rendered as text (numbers keep full precision).
    pub fill_value: String,
}

/// Rows dropped by the outlier filter and the resulting frame shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub columns: Vec<String>,
    pub contamination: f64,
    pub rows_removed: usize,
    /// `(rows, columns)` after filtering.
    pub shape_after: (usize, usize),
}

/// Output of [`OutlierFilter::filter`](crate::outliers::OutlierFilter::filter).
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// The surviving rows, unmodified.
    pub data: DataFrame,
    pub report: OutlierReport,
}

/// Summary of a complete cleaning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,
    pub columns: usize,
    pub missing_before: usize,
    pub imputations: Vec<ImputationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outliers: Option<OutlierReport>,
    pub processing_steps: Vec<String>,
    pub duration_ms: u64,
}

impl CleaningSummary {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The surviving, fully imputed subset of a raw dataset.
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    pub data: DataFrame,
    pub summary: CleaningSummary,
}

impl CleanedDataset {
    /// `(rows, columns)` of the cleaned frame.
    pub fn shape(&self) -> (usize, usize) {
        self.data.shape()
    }
}
