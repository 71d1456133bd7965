//! House Sale Data Cleaning Library
//!
//! Prepares raw historical house sale records for model training, built on
//! Polars.
//!
//! # Overview
//!
//! - **Imputation**: numeric columns are filled with their median, string and
//!   boolean columns with their most frequent value
//! - **Outlier removal**: whole rows flagged by an isolation forest on the
//!   configured columns (default `price`) are dropped
//! - **CSV I/O**: load a raw file, clean it and write the result in one call
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use house_processing::{CleaningConfig, DataCleaner, load_csv, write_csv};
//!
//! let raw = load_csv("data/raw/house_data.csv")?;
//!
//! let config = CleaningConfig::builder()
//!     .outlier_columns(["price"])
//!     .contamination(0.05)
//!     .random_state(42)
//!     .build()?;
//!
//! let cleaned = DataCleaner::new(config).clean(&raw)?;
//! println!("Removed {} rows", cleaned.summary.rows_removed);
//!
//! let mut data = cleaned.data;
//! write_csv(&mut data, "data/processed/cleaned_house_data.csv")?;
//! ```
//!
//! # Custom detectors
//!
//! [`OutlierFilter`] is generic over [`detectors::AnomalyDetector`]; the
//! default is [`detectors::IsolationForest`]. Outlier removal depends on the
//! whole dataset and is reproducible only for identical input and seed.

pub mod cleaner;
pub mod config;
pub mod detectors;
pub mod error;
pub mod imputers;
pub mod io;
pub mod outliers;
pub mod types;
pub mod utils;

pub use cleaner::DataCleaner;
pub use config::{CleaningConfig, CleaningConfigBuilder, ConfigValidationError, DetectorConfig};
pub use detectors::{AnomalyDetector, AnomalyLabel, IsolationForest};
pub use error::{ProcessingError, Result, ResultExt};
pub use imputers::StatisticalImputer;
pub use io::{load_csv, process_file, write_csv};
pub use outliers::OutlierFilter;
pub use types::{
    CleanedDataset, CleaningSummary, FilterOutcome, ImputationRecord, ImputationStrategy,
    OutlierReport,
};

static_assertions::assert_impl_all!(DataCleaner: Send, Sync);
static_assertions::assert_impl_all!(IsolationForest: AnomalyDetector);
