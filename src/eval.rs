//! Train/test splitting and classifier evaluation.
//!
//! One stratified split is drawn per run from the configured seed; every
//! configured k is then scored against that same split, so accuracies
//! across k values are directly comparable.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{NormalizationMode, PipelineConfig};
use crate::dataset::{Dataset, LabeledRow, NormalizationStats};
use crate::knn::{ClassifierError, KnnClassifier, TrainingRow};

/// Row indices of one train/test partition, each sorted ascending so
/// downstream iteration order is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified random split: within each label class the rows are
/// shuffled with the seeded generator and `round(fraction * class_size)`
/// of them go to the training set.
pub fn stratified_split(labels: &[u8], train_fraction: f64, seed: u64) -> SplitIndices {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [0u8, 1u8] {
        let mut indices: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter_map(|(i, &l)| (l == class).then_some(i))
            .collect();
        indices.shuffle(&mut rng);

        let take = ((indices.len() as f64) * train_fraction).round() as usize;
        let take = take.min(indices.len());
        train.extend_from_slice(&indices[..take]);
        test.extend_from_slice(&indices[take..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    SplitIndices { train, test }
}

/// 2x2 confusion matrix, predicted x actual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn record(&mut self, predicted: u8, actual: u8) {
        self.counts[predicted as usize][actual as usize] += 1;
    }

    pub fn count(&self, predicted: u8, actual: u8) -> usize {
        self.counts[predicted as usize][actual as usize]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        self.counts[0][0] + self.counts[1][1]
    }

    pub fn accuracy(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.correct() as f64 / self.total() as f64
        }
    }
}

impl std::fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "                actual=1  actual=0")?;
        writeln!(
            f,
            "  predicted=1  {:>8}  {:>8}",
            self.count(1, 1),
            self.count(1, 0)
        )?;
        write!(
            f,
            "  predicted=0  {:>8}  {:>8}",
            self.count(0, 1),
            self.count(0, 0)
        )
    }
}

/// Score of one k value against the shared split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnEvaluation {
    pub k: usize,
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
}

/// Everything a run produces: the normalized dataset for inspection, the
/// statistics it was scaled with, and one evaluation per usable k.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub normalized: Dataset,
    pub stats: NormalizationStats,
    pub train_size: usize,
    pub test_size: usize,
    pub evaluations: Vec<KnnEvaluation>,
    /// k values the classifier rejected, with the rejection reason.
    /// A bad k spoils only its own score, never the rest of the run.
    pub rejected: Vec<(usize, ClassifierError)>,
}

/// Split, normalize, and score every configured k against the held-out
/// rows. The normalization statistics are fitted once, per the
/// configured mode, and treated as read-only afterwards.
///
/// A k the classifier rejects is recorded in the report and skipped;
/// the run fails only when no configured k is usable at all.
pub fn evaluate(
    dataset: &Dataset,
    config: &PipelineConfig,
) -> Result<EvaluationReport, ClassifierError> {
    let labels = dataset.labels();
    let split = stratified_split(&labels, config.train_fraction, config.random_seed);

    let stats = match config.normalization {
        NormalizationMode::GlobalPreSplit => NormalizationStats::fit(&dataset.rows),
        NormalizationMode::TrainOnly => {
            let train_rows: Vec<LabeledRow> = split
                .train
                .iter()
                .map(|&i| dataset.rows[i].clone())
                .collect();
            NormalizationStats::fit(&train_rows)
        }
    };
    let normalized = stats.apply(dataset);

    let train: Vec<TrainingRow> = split
        .train
        .iter()
        .map(|&i| (normalized.rows[i].vector.features, normalized.rows[i].label))
        .collect();

    let mut evaluations = Vec::with_capacity(config.k_values.len());
    let mut rejected = Vec::new();
    for &k in &config.k_values {
        let classifier = match KnnClassifier::fit(k, train.clone()) {
            Ok(classifier) => classifier,
            Err(error) => {
                warn!(k, %error, "skipping unusable k");
                rejected.push((k, error));
                continue;
            }
        };
        let mut confusion = ConfusionMatrix::default();
        for &i in &split.test {
            let row = &normalized.rows[i];
            let predicted = classifier.predict(&row.vector.features);
            confusion.record(predicted, row.label);
        }
        let accuracy = confusion.accuracy();
        info!(k, accuracy, "evaluated classifier");
        evaluations.push(KnnEvaluation {
            k,
            confusion,
            accuracy,
        });
    }

    if evaluations.is_empty() {
        if let Some((_, error)) = rejected.first() {
            return Err(error.clone());
        }
    }

    Ok(EvaluationReport {
        normalized,
        stats,
        train_size: split.train.len(),
        test_size: split.test.len(),
        evaluations,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_is_stratified_and_seeded() {
        let labels: Vec<u8> = (0..100).map(|i| u8::from(i % 2 == 0)).collect();
        let split = stratified_split(&labels, 0.8, 7);

        assert_eq!(split.train.len(), 80);
        assert_eq!(split.test.len(), 20);
        let train_ones = split.train.iter().filter(|&&i| labels[i] == 1).count();
        assert_eq!(train_ones, 40);

        // Same seed reproduces the split exactly; a different seed does not.
        assert_eq!(split, stratified_split(&labels, 0.8, 7));
        assert_ne!(split, stratified_split(&labels, 0.8, 8));
    }

    #[test]
    fn test_split_covers_all_rows_once() {
        let labels: Vec<u8> = (0..37).map(|i| u8::from(i % 3 == 0)).collect();
        let split = stratified_split(&labels, 0.8, 1);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..labels.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_confusion_matrix_accuracy() {
        let mut matrix = ConfusionMatrix::default();
        matrix.record(1, 1);
        matrix.record(1, 1);
        matrix.record(0, 0);
        matrix.record(1, 0); // false positive
        assert_eq!(matrix.total(), 4);
        assert_eq!(matrix.correct(), 3);
        assert_eq!(matrix.count(1, 0), 1);
        assert!((matrix.accuracy() - 0.75).abs() < 1e-12);
    }
}
