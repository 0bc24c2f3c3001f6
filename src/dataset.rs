//! Dataset assembly and normalization.
//!
//! Per-window features and labels are joined by explicit `(day,
//! center_second)` key, never by positional order, so a dropped window in
//! one channel can not silently shift every later row. Rows missing any
//! feature or the label are dropped outright (complete-case filtering).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::align::AlignedDay;
use crate::core::features::extract_features;
use crate::core::labels::aggregate_labels;
use crate::core::windowing::WindowPlan;
use crate::series::Channel;

/// Number of feature columns: mean and SAD for each of three phases.
pub const FEATURE_COUNT: usize = 6;

/// Feature column names, in column order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["mean_p1", "mean_p2", "mean_p3", "sad_p1", "sad_p2", "sad_p3"];

/// One row of the dataset: the six power features of one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub day: NaiveDate,
    /// Canonical second-of-day timestamp of the window.
    pub center_second: u32,
    /// `day + center_second`, for traceability of individual rows.
    pub datetime: NaiveDateTime,
    /// Columns in [`FEATURE_NAMES`] order.
    pub features: [f64; FEATURE_COUNT],
}

/// A feature vector with its occupancy label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRow {
    pub vector: FeatureVector,
    /// 1 = occupied, 0 = absent.
    pub label: u8,
}

/// The ordered collection of labeled windows surviving alignment and
/// complete-case filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub rows: Vec<LabeledRow>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn labels(&self) -> Vec<u8> {
        self.rows.iter().map(|r| r.label).collect()
    }

    /// Count of rows with the given label.
    pub fn label_count(&self, label: u8) -> usize {
        self.rows.iter().filter(|r| r.label == label).count()
    }
}

/// Join per-window features and labels across all aligned days.
///
/// A row is emitted only when all six features and the label are defined
/// for its `(day, center_second)` key; anything else is dropped, not
/// imputed.
pub fn build_dataset(days: &BTreeMap<NaiveDate, AlignedDay>, plan: &WindowPlan) -> Dataset {
    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for (&day, aligned) in days {
        // Keyed per-channel feature maps for this day.
        let mut means: [BTreeMap<u32, f64>; 3] = Default::default();
        let mut sads: [BTreeMap<u32, f64>; 3] = Default::default();
        for (i, channel) in Channel::POWER_PHASES.into_iter().enumerate() {
            for (window, stats) in extract_features(aligned.power_phase(channel), plan) {
                if let Some(mean) = stats.mean {
                    means[i].insert(window.center_second(), mean);
                    sads[i].insert(window.center_second(), stats.sad);
                }
            }
        }
        let labels: BTreeMap<u32, u8> = aggregate_labels(&aligned.occupancy, plan)
            .into_iter()
            .filter_map(|(window, label)| label.map(|l| (window.center_second(), l)))
            .collect();

        for window in plan.windows() {
            let center = window.center_second();
            let complete = means.iter().all(|m| m.contains_key(&center))
                && labels.contains_key(&center);
            if !complete {
                dropped += 1;
                continue;
            }
            let features = [
                means[0][&center],
                means[1][&center],
                means[2][&center],
                sads[0][&center],
                sads[1][&center],
                sads[2][&center],
            ];
            rows.push(LabeledRow {
                vector: FeatureVector {
                    day,
                    center_second: center,
                    datetime: day
                        .and_hms_opt(0, 0, 0)
                        .expect("midnight exists")
                        + chrono::Duration::seconds(center as i64),
                    features,
                },
                label: labels[&center],
            });
        }
    }

    if dropped > 0 {
        debug!(dropped, kept = rows.len(), "dropped incomplete windows");
    }
    Dataset { rows }
}

/// Immutable per-column min/max statistics for `[0, 1]` rescaling.
///
/// Computed once and passed by value to every later consumer; nothing
/// downstream recomputes or mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    pub min: [f64; FEATURE_COUNT],
    pub max: [f64; FEATURE_COUNT],
    /// Columns where max == min. Such a column carries no information and
    /// is mapped to 0.0 instead of dividing by zero; the condition is
    /// surfaced to the caller, not patched silently.
    pub degenerate: [bool; FEATURE_COUNT],
}

impl NormalizationStats {
    /// Fit min/max over the given rows. Degenerate columns are reported
    /// through the returned stats and a warning.
    pub fn fit(rows: &[LabeledRow]) -> Self {
        let mut min = [f64::INFINITY; FEATURE_COUNT];
        let mut max = [f64::NEG_INFINITY; FEATURE_COUNT];
        for row in rows {
            for (col, &x) in row.vector.features.iter().enumerate() {
                min[col] = min[col].min(x);
                max[col] = max[col].max(x);
            }
        }

        let mut degenerate = [false; FEATURE_COUNT];
        for col in 0..FEATURE_COUNT {
            if rows.is_empty() || max[col] == min[col] {
                degenerate[col] = true;
                if !rows.is_empty() {
                    warn!(
                        column = FEATURE_NAMES[col],
                        value = min[col],
                        "feature column has zero variance, normalizing to 0"
                    );
                }
            }
        }
        Self {
            min,
            max,
            degenerate,
        }
    }

    /// Names of the degenerate columns, for reporting.
    pub fn degenerate_columns(&self) -> Vec<&'static str> {
        FEATURE_NAMES
            .iter()
            .zip(self.degenerate)
            .filter_map(|(&name, d)| d.then_some(name))
            .collect()
    }

    /// Rescale one feature vector to `[0, 1]` per column.
    pub fn normalize(&self, features: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for col in 0..FEATURE_COUNT {
            if !self.degenerate[col] {
                out[col] = (features[col] - self.min[col]) / (self.max[col] - self.min[col]);
            }
        }
        out
    }

    /// Inverse of [`normalize`](Self::normalize) for non-degenerate columns.
    pub fn denormalize(&self, features: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for col in 0..FEATURE_COUNT {
            out[col] = if self.degenerate[col] {
                self.min[col]
            } else {
                features[col] * (self.max[col] - self.min[col]) + self.min[col]
            };
        }
        out
    }

    /// Apply the stats to every row, producing a normalized dataset.
    pub fn apply(&self, dataset: &Dataset) -> Dataset {
        let rows = dataset
            .rows
            .iter()
            .map(|row| LabeledRow {
                vector: FeatureVector {
                    features: self.normalize(&row.vector.features),
                    ..row.vector
                },
                label: row.label,
            })
            .collect();
        Dataset { rows }
    }
}
