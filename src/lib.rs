//! Wattwitness - occupancy detection from household electricity traces.
//!
//! This library turns per-second electricity consumption (three phases)
//! and manually labeled occupancy observations into a windowed feature
//! dataset, then trains and scores a k-nearest-neighbor classifier that
//! predicts occupancy from power alone.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Wattwitness                             │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌──────────┐   ┌───────────────┐   ┌──────────┐ │
//! │  │  Align   │──▶│ Windows  │──▶│ Features +    │──▶│ Dataset  │ │
//! │  │ (days)   │   │ (15 min) │   │ Labels        │   │ (min/max)│ │
//! │  └──────────┘   └──────────┘   └───────────────┘   └──────────┘ │
//! │                                                          │       │
//! │                                  ┌──────────┐   ┌──────────┐    │
//! │                                  │ Evaluate │◀──│  Split   │    │
//! │                                  │ (k-NN)   │   │ (80/20)  │    │
//! │                                  └──────────┘   └──────────┘    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Determinism
//!
//! Every stage is a pure transformation of an immutable input, the split
//! is drawn from a fixed seed, and every classifier tie-break is
//! documented and deterministic. Running the pipeline twice on identical
//! inputs yields bit-identical datasets, splits and scores.
//!
//! # Example
//!
//! ```no_run
//! use wattwitness::{align, config::PipelineConfig, core::WindowPlan, dataset, eval};
//!
//! let config = PipelineConfig::default();
//! config.validate().expect("valid configuration");
//!
//! # let occupancy = wattwitness::align::OccupancyTable::default();
//! # let p1 = wattwitness::align::PhaseTable::new(wattwitness::series::Channel::Phase1);
//! # let p2 = wattwitness::align::PhaseTable::new(wattwitness::series::Channel::Phase2);
//! # let p3 = wattwitness::align::PhaseTable::new(wattwitness::series::Channel::Phase3);
//! let days = align::align(&occupancy, [&p1, &p2, &p3], config.active_window).expect("aligned");
//! let plan = WindowPlan::new(config.active_window, config.window_length_secs).unwrap();
//! let dataset = dataset::build_dataset(&days, &plan);
//! let report = eval::evaluate(&dataset, &config).expect("evaluation");
//! for evaluation in &report.evaluations {
//!     println!("k={} accuracy={:.3}", evaluation.k, evaluation.accuracy);
//! }
//! ```

pub mod align;
pub mod config;
pub mod core;
pub mod dataset;
pub mod eval;
pub mod knn;
pub mod loader;
pub mod series;

// Re-export key types at crate root for convenience
pub use align::{align, AlignError, AlignedDay, OccupancyRow, OccupancyTable, PhaseTable};
pub use config::{ActiveWindow, ConfigError, NormalizationMode, PipelineConfig};
pub use crate::core::{WindowPlan, WindowStats};
pub use dataset::{build_dataset, Dataset, FeatureVector, LabeledRow, NormalizationStats};
pub use eval::{evaluate, ConfusionMatrix, EvaluationReport, KnnEvaluation};
pub use knn::{ClassifierError, KnnClassifier};
pub use series::{Channel, DaySeries};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
