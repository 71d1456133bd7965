//! Anomaly detectors used by the outlier filter.
//!
//! A detector sees a row-major numeric matrix and returns one label per row.
//! [`IsolationForest`] is the reference implementation; anything else
//! implementing [`AnomalyDetector`] can be plugged into
//! [`OutlierFilter`](crate::outliers::OutlierFilter).

mod isolation_forest;

pub use isolation_forest::IsolationForest;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Per-row verdict of an anomaly detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyLabel {
    Normal,
    Anomalous,
}

impl AnomalyLabel {
    /// Map the `1` / `-1` convention of `fit_predict` style detectors.
    pub fn from_sign(value: i8) -> Option<Self> {
        match value {
            1 => Some(Self::Normal),
            -1 => Some(Self::Anomalous),
            _ => None,
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// Anomaly detection capability.
///
/// Implementations fit on the given matrix and label the same rows in one
/// call. The decision boundary depends on the data: labels for a row may
/// change when other rows are added, removed or reordered.
pub trait AnomalyDetector: Send + Sync {
    /// Label every row of `matrix`, flagging roughly `contamination` of them.
    fn fit_predict(&self, matrix: &[Vec<f64>], contamination: f64) -> Result<Vec<AnomalyLabel>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sign() {
        assert_eq!(AnomalyLabel::from_sign(1), Some(AnomalyLabel::Normal));
        assert_eq!(AnomalyLabel::from_sign(-1), Some(AnomalyLabel::Anomalous));
        assert_eq!(AnomalyLabel::from_sign(0), None);
    }

    #[test]
    fn test_is_normal() {
        assert!(AnomalyLabel::Normal.is_normal());
        assert!(!AnomalyLabel::Anomalous.is_normal());
    }
}
