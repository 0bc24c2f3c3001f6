//! Per-window occupancy label aggregation.
//!
//! Fine-grained occupancy observations are reduced to one binary label
//! per window by majority: the mean of present states, rounded to the
//! nearest integer with ties (exactly 0.5) rounding toward absence.

use crate::core::windowing::{Window, WindowPlan};
use crate::series::DaySeries;

/// Majority label of one window's occupancy samples.
///
/// Returns `None` when the window has no present sample; such windows
/// are dropped downstream rather than guessed.
pub fn window_label(samples: &[Option<f64>]) -> Option<u8> {
    let present: Vec<f64> = samples.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;
    // Ties round down: an evenly split window counts as absent.
    Some(u8::from(mean > 0.5))
}

/// Aggregate labels for every window of the plan over the occupancy series.
pub fn aggregate_labels(series: &DaySeries, plan: &WindowPlan) -> Vec<(Window, Option<u8>)> {
    debug_assert_eq!(series.start_second, plan.active_window().start_second);
    debug_assert_eq!(series.len() as u32, plan.active_window().span_secs());

    plan.windows()
        .map(|window| {
            let label = window_label(series.span(window.start_second, window.length));
            (window, label)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_occupied() {
        let samples = [Some(1.0), Some(1.0), Some(1.0), Some(0.0)];
        assert_eq!(window_label(&samples), Some(1));
    }

    #[test]
    fn test_majority_absent() {
        let samples = [Some(0.0), Some(0.0), Some(1.0), Some(0.0)];
        assert_eq!(window_label(&samples), Some(0));
    }

    #[test]
    fn test_exact_tie_rounds_to_absent() {
        let samples = [Some(1.0), Some(0.0), Some(1.0), Some(0.0)];
        assert_eq!(window_label(&samples), Some(0));
    }

    #[test]
    fn test_gaps_excluded_from_vote() {
        // Two present samples, both occupied; the gaps do not dilute.
        let samples = [None, Some(1.0), None, Some(1.0)];
        assert_eq!(window_label(&samples), Some(1));
    }

    #[test]
    fn test_empty_window_has_no_label() {
        assert_eq!(window_label(&[None, None]), None);
    }
}
