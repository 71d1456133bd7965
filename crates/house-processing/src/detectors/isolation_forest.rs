//! Isolation forest anomaly detector.
//!
//! Rows that are isolated by few random axis-aligned splits are anomalous.
//! Each tree is grown on a random subsample of `min(max_samples, n)` rows up
//! to depth `ceil(log2(subsample))`; a row's anomaly score is
//! `2^(-E[h(x)] / c(subsample))` where `h` is the path length and `c` the
//! average path length of an unsuccessful binary search tree lookup. The
//! `contamination` fraction of rows with the highest scores are flagged.

use super::{AnomalyDetector, AnomalyLabel};
use crate::config::{DetectorConfig, validate_contamination};
use crate::error::{ProcessingError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Isolation forest configured with a fixed seed.
#[derive(Debug, Clone, Default)]
pub struct IsolationForest {
    config: DetectorConfig,
}

enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl IsolationForest {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Fit on `matrix` and return each row's anomaly score in `(0, 1]`.
    ///
    /// Higher means more anomalous. Scores are reproducible for the same
    /// matrix and seed.
    pub fn score_samples(&self, matrix: &[Vec<f64>]) -> Result<Vec<f64>> {
        let n_rows = matrix.len();
        if n_rows < 2 {
            return Ok(vec![0.5; n_rows]);
        }
        let n_features = Self::validate_matrix(matrix)?;

        let subsample = self.config.max_samples.min(n_rows);
        let height_limit = (subsample as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.config.random_state);

        let trees: Vec<Node> = (0..self.config.n_estimators)
            .map(|_| {
                let mut indices = rand::seq::index::sample(&mut rng, n_rows, subsample).into_vec();
                Self::grow(matrix, n_features, &mut indices, 0, height_limit, &mut rng)
            })
            .collect();

        let normaliser = average_path_length(subsample);
        let scores = matrix
            .iter()
            .map(|row| {
                let mean_path = trees
                    .iter()
                    .map(|tree| Self::path_length(tree, row, 0))
                    .sum::<f64>()
                    / trees.len() as f64;
                2f64.powf(-mean_path / normaliser)
            })
            .collect();

        Ok(scores)
    }

    fn validate_matrix(matrix: &[Vec<f64>]) -> Result<usize> {
        let n_features = matrix[0].len();
        if n_features == 0 {
            return Err(ProcessingError::DetectorFailed(
                "feature matrix has no columns".to_string(),
            ));
        }
        for (i, row) in matrix.iter().enumerate() {
            if row.len() != n_features {
                return Err(ProcessingError::DetectorFailed(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    n_features
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(ProcessingError::DetectorFailed(format!(
                    "row {} contains a non-finite value",
                    i
                )));
            }
        }
        Ok(n_features)
    }

    fn grow(
        matrix: &[Vec<f64>],
        n_features: usize,
        indices: &mut [usize],
        depth: usize,
        height_limit: usize,
        rng: &mut StdRng,
    ) -> Node {
        if depth >= height_limit || indices.len() <= 1 {
            return Node::Leaf {
                size: indices.len(),
            };
        }

        // Only features that still vary within this node can split it
        let splittable: Vec<(usize, f64, f64)> = (0..n_features)
            .filter_map(|feature| {
                let (min, max) = indices.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(min, max), &i| (min.min(matrix[i][feature]), max.max(matrix[i][feature])),
                );
                (max > min).then_some((feature, min, max))
            })
            .collect();

        if splittable.is_empty() {
            return Node::Leaf {
                size: indices.len(),
            };
        }

        let (feature, min, max) = splittable[rng.gen_range(0..splittable.len())];
        let threshold = if (max - min).is_finite() {
            rng.gen_range(min..max)
        } else {
            // Span overflows f64; interpolate between the endpoints instead
            let t: f64 = rng.gen_range(0.0..1.0);
            min * (1.0 - t) + max * t
        };

        // Partition in place: rows with value <= threshold first
        let mut split = 0;
        for j in 0..indices.len() {
            if matrix[indices[j]][feature] <= threshold {
                indices.swap(split, j);
                split += 1;
            }
        }

        let (left, right) = indices.split_at_mut(split);
        Node::Split {
            feature,
            threshold,
            left: Box::new(Self::grow(matrix, n_features, left, depth + 1, height_limit, rng)),
            right: Box::new(Self::grow(matrix, n_features, right, depth + 1, height_limit, rng)),
        }
    }

    fn path_length(node: &Node, row: &[f64], depth: usize) -> f64 {
        match node {
            Node::Leaf { size } => depth as f64 + average_path_length(*size),
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    Self::path_length(left, row, depth + 1)
                } else {
                    Self::path_length(right, row, depth + 1)
                }
            }
        }
    }
}

impl AnomalyDetector for IsolationForest {
    fn fit_predict(&self, matrix: &[Vec<f64>], contamination: f64) -> Result<Vec<AnomalyLabel>> {
        validate_contamination(contamination)
            .map_err(|e| ProcessingError::InvalidConfig(e.to_string()))?;

        let scores = self.score_samples(matrix)?;
        if scores.len() < 2 {
            return Ok(vec![AnomalyLabel::Normal; scores.len()]);
        }

        let threshold = quantile(&scores, 1.0 - contamination);
        let labels: Vec<AnomalyLabel> = scores
            .iter()
            .map(|&s| {
                if s > threshold {
                    AnomalyLabel::Anomalous
                } else {
                    AnomalyLabel::Normal
                }
            })
            .collect();

        debug!(
            "Isolation forest: {} trees, threshold {:.4}, {} of {} rows anomalous",
            self.config.n_estimators,
            threshold,
            labels.iter().filter(|l| !l.is_normal()).count(),
            labels.len()
        );

        Ok(labels)
    }
}

/// Average path length of an unsuccessful search in a binary search tree of
/// `n` nodes.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linearly interpolated quantile `q` in `[0, 1]` of `values`.
fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
