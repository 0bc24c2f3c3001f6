//! Core windowed aggregation.
//!
//! This module contains:
//! - Window planning over the active span of a day
//! - Per-window feature computation (mean, sum of absolute differences)
//! - Per-window occupancy label aggregation

pub mod features;
pub mod labels;
pub mod windowing;

// Re-export commonly used types
pub use features::{extract_features, window_stats, WindowStats};
pub use labels::{aggregate_labels, window_label};
pub use windowing::{Window, WindowError, WindowPlan};
