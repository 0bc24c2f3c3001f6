//! Per-window feature computation.
//!
//! Two statistics are computed per window and channel: the mean of
//! present samples, and the sum of absolute differences (SAD) over
//! adjacent present sample pairs. SAD measures within-window variability
//! independent of the mean level, which is what separates an appliance
//! being switched by a person from one idling at a constant draw.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::core::windowing::{Window, WindowPlan};
use crate::series::DaySeries;

/// Summary statistics of one window of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Mean of present samples; `None` when every sample is absent.
    pub mean: Option<f64>,
    /// Sum of |x[i+1] - x[i]| over pairs where both samples are present.
    /// An absent sample breaks adjacency, so a gap never counts as a
    /// transition. Fewer than two present samples yield 0.
    pub sad: f64,
}

/// Compute window statistics from one window's samples.
pub fn window_stats(samples: &[Option<f64>]) -> WindowStats {
    let present: Vec<f64> = samples.iter().flatten().copied().collect();
    let mean = if present.is_empty() {
        None
    } else {
        Some(present.iter().mean())
    };

    let sad = samples
        .windows(2)
        .filter_map(|pair| match (pair[0], pair[1]) {
            (Some(a), Some(b)) => Some((b - a).abs()),
            _ => None,
        })
        .sum();

    WindowStats { mean, sad }
}

/// Compute statistics for every window of the plan over one day series.
///
/// Output is ordered by window index, so the rows of different channels
/// of the same day line up by `center_second`.
pub fn extract_features(series: &DaySeries, plan: &WindowPlan) -> Vec<(Window, WindowStats)> {
    debug_assert_eq!(series.start_second, plan.active_window().start_second);
    debug_assert_eq!(series.len() as u32, plan.active_window().span_secs());

    plan.windows()
        .map(|window| {
            let stats = window_stats(series.span(window.start_second, window.length));
            (window, stats)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActiveWindow;
    use crate::series::Channel;
    use chrono::NaiveDate;

    #[test]
    fn test_gap_breaks_adjacency() {
        // Only the (10, 10) pair is adjacent-present; the gap swallows
        // both pairs it touches.
        let samples = [Some(10.0), Some(10.0), None, Some(10.0)];
        let stats = window_stats(&samples);
        assert_eq!(stats.mean, Some(10.0));
        assert_eq!(stats.sad, 0.0);
    }

    #[test]
    fn test_sad_matches_naive_on_gap_free_window() {
        let values = [3.0, 7.0, 2.0, 2.0, 9.5];
        let samples: Vec<Option<f64>> = values.iter().map(|&v| Some(v)).collect();

        let naive: f64 = values.windows(2).map(|p| (p[1] - p[0]).abs()).sum();
        let stats = window_stats(&samples);
        assert_eq!(stats.sad, naive);
        assert_eq!(stats.sad, 4.0 + 5.0 + 0.0 + 7.5);
    }

    #[test]
    fn test_all_absent_window_has_no_mean() {
        let stats = window_stats(&[None, None, None]);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.sad, 0.0);
    }

    #[test]
    fn test_single_present_sample() {
        // Mean is still defined, SAD has no pair to sum.
        let stats = window_stats(&[None, Some(42.0), None]);
        assert_eq!(stats.mean, Some(42.0));
        assert_eq!(stats.sad, 0.0);
    }

    #[test]
    fn test_extract_features_aligns_with_plan() {
        let active = ActiveWindow::new(0, 12);
        let plan = WindowPlan::new(active, 4).unwrap();
        let day = NaiveDate::from_ymd_opt(2012, 6, 1).unwrap();

        let watts: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let series = DaySeries::from_power(day, Channel::Phase1, 0, &watts);

        let features = extract_features(&series, &plan);
        assert_eq!(features.len(), 3);
        assert_eq!(features[0].0.center_second(), 2);
        assert_eq!(features[0].1.mean, Some(1.5));
        assert_eq!(features[0].1.sad, 3.0);
        assert_eq!(features[2].1.mean, Some(9.5));
    }
}
