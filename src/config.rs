//! Configuration for the occupancy detection pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::series::SECONDS_PER_DAY;

/// Half-open daily time span `[start_second, end_second)` in seconds of day.
///
/// The same interval convention is applied to occupancy and power series,
/// so both are trimmed to exactly `end_second - start_second` samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWindow {
    pub start_second: u32,
    pub end_second: u32,
}

impl ActiveWindow {
    pub fn new(start_second: u32, end_second: u32) -> Self {
        Self {
            start_second,
            end_second,
        }
    }

    /// Number of seconds covered by the window.
    pub fn span_secs(&self) -> u32 {
        self.end_second.saturating_sub(self.start_second)
    }

    pub fn contains(&self, second_of_day: u32) -> bool {
        second_of_day >= self.start_second && second_of_day < self.end_second
    }
}

impl Default for ActiveWindow {
    /// 06:00:00 to 22:00:00, the span where occupancy is modeled.
    fn default() -> Self {
        Self {
            start_second: 6 * 3600,
            end_second: 22 * 3600,
        }
    }
}

/// How min/max normalization statistics are fitted relative to the
/// train/test split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    /// Fit on the full dataset before splitting. This reproduces the
    /// original study and carries a mild lookahead bias: test-set extrema
    /// influence the scaling seen by the training set.
    GlobalPreSplit,
    /// Fit on the training rows only, then apply to both subsets.
    TrainOnly,
}

/// Main configuration for the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Daily span considered for analysis.
    pub active_window: ActiveWindow,

    /// Length of each aggregation window in seconds. Must divide the
    /// active window span exactly.
    pub window_length_secs: u32,

    /// Neighbor counts to evaluate, each against the same split.
    pub k_values: Vec<usize>,

    /// Fraction of rows assigned to the training set, per label class.
    pub train_fraction: f64,

    /// Seed for the stratified split. Fixed so repeated runs produce
    /// bit-identical datasets, splits and scores.
    pub random_seed: u64,

    /// Where normalization statistics are fitted.
    pub normalization: NormalizationMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            active_window: ActiveWindow::default(),
            window_length_secs: 900,
            k_values: vec![1, 5, 10, 20],
            train_fraction: 0.8,
            random_seed: 42,
            normalization: NormalizationMode::GlobalPreSplit,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check the configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let span = self.active_window.span_secs();
        if span == 0 {
            return Err(ConfigError::EmptyActiveWindow {
                start: self.active_window.start_second,
                end: self.active_window.end_second,
            });
        }
        if self.active_window.end_second > SECONDS_PER_DAY {
            return Err(ConfigError::ActiveWindowPastMidnight {
                end: self.active_window.end_second,
            });
        }
        if self.window_length_secs == 0 {
            return Err(ConfigError::ZeroWindowLength);
        }
        if span % self.window_length_secs != 0 {
            return Err(ConfigError::IndivisibleWindow {
                window: self.window_length_secs,
                span,
            });
        }
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(ConfigError::BadTrainFraction(self.train_fraction));
        }
        if self.k_values.is_empty() || self.k_values.iter().any(|&k| k == 0) {
            return Err(ConfigError::BadKValues);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("active window [{start}, {end}) is empty or reversed")]
    EmptyActiveWindow { start: u32, end: u32 },

    #[error("active window end {end} lies past midnight")]
    ActiveWindowPastMidnight { end: u32 },

    #[error("window length must be positive")]
    ZeroWindowLength,

    #[error("window length {window}s does not divide the active span {span}s")]
    IndivisibleWindow { window: u32, span: u32 },

    #[error("train fraction {0} must be strictly between 0 and 1")]
    BadTrainFraction(f64),

    #[error("k values must be non-empty and positive")]
    BadKValues,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.active_window.span_secs(), 16 * 3600);
        assert_eq!(config.window_length_secs, 900);
    }

    #[test]
    fn test_indivisible_window_rejected() {
        let config = PipelineConfig {
            window_length_secs: 1000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::IndivisibleWindow { .. })
        ));
    }

    #[test]
    fn test_bad_train_fraction_rejected() {
        for fraction in [0.0, 1.0, -0.2, 1.5] {
            let config = PipelineConfig {
                train_fraction: fraction,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::BadTrainFraction(_))
            ));
        }
    }

    #[test]
    fn test_zero_k_rejected() {
        let config = PipelineConfig {
            k_values: vec![1, 0],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::BadKValues)));
    }

    #[test]
    fn test_active_window_half_open() {
        let window = ActiveWindow::default();
        assert!(window.contains(6 * 3600));
        assert!(window.contains(22 * 3600 - 1));
        assert!(!window.contains(22 * 3600));
        assert!(!window.contains(6 * 3600 - 1));
    }
}
