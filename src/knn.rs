//! k-nearest-neighbor classification.
//!
//! Instance-based: fitting stores the normalized training rows as a
//! read-only brute-force index, and all cost is paid per query. Every
//! tie-break is deterministic so repeated runs score identically:
//! neighbors at equal distance keep training-set order (stable sort),
//! and an evenly split vote resolves to label 0 (absent).

use thiserror::Error;

use crate::dataset::FEATURE_COUNT;

/// A stored training example: normalized features and label.
pub type TrainingRow = ([f64; FEATURE_COUNT], u8);

/// Majority-vote classifier over the k nearest training rows under
/// Euclidean distance.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    k: usize,
    train: Vec<TrainingRow>,
}

impl KnnClassifier {
    /// Build the classifier from training rows.
    ///
    /// `k` must be positive and smaller than the training set, otherwise
    /// the vote is ill-defined.
    pub fn fit(k: usize, train: Vec<TrainingRow>) -> Result<Self, ClassifierError> {
        if k == 0 || k >= train.len() {
            return Err(ClassifierError::InvalidK {
                k,
                train_len: train.len(),
            });
        }
        Ok(Self { k, train })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn train_len(&self) -> usize {
        self.train.len()
    }

    /// Predict the label of one query point.
    pub fn predict(&self, query: &[f64; FEATURE_COUNT]) -> u8 {
        let mut distances: Vec<(f64, u8)> = self
            .train
            .iter()
            .map(|(features, label)| (euclidean(query, features), *label))
            .collect();
        // Stable sort: equal distances keep training-set order, so the
        // neighbor set at the k-th distance is deterministic.
        distances.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let occupied_votes = distances
            .iter()
            .take(self.k)
            .filter(|(_, label)| *label == 1)
            .count();
        // Strict majority for "occupied"; a 50/50 vote falls to absent.
        u8::from(2 * occupied_votes > self.k)
    }
}

fn euclidean(a: &[f64; FEATURE_COUNT], b: &[f64; FEATURE_COUNT]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Classifier configuration errors, fatal for the offending call only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    #[error("k = {k} is invalid for a training set of {train_len} rows")]
    InvalidK { k: usize, train_len: usize },
}
