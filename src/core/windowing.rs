//! Window planning over the active span of a day.
//!
//! Each day's active span is partitioned into fixed-length,
//! non-overlapping windows with no remainder. The window center second
//! is the canonical timestamp used to key features and labels.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ActiveWindow;

/// A fixed-length span of consecutive seconds within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Second of day of the first sample in the window.
    pub start_second: u32,
    /// Window length in seconds.
    pub length: u32,
}

impl Window {
    /// Canonical timestamp of the window, in seconds of day.
    pub fn center_second(&self) -> u32 {
        self.start_second + self.length / 2
    }

    pub fn contains(&self, second_of_day: u32) -> bool {
        second_of_day >= self.start_second && second_of_day < self.start_second + self.length
    }
}

/// An exact partition of an active span into equal windows.
///
/// Invariant: `window_count * window_length == active.span_secs()`, so
/// the windows cover the span with no overlap and no gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    active: ActiveWindow,
    window_length: u32,
}

impl WindowPlan {
    pub fn new(active: ActiveWindow, window_length: u32) -> Result<Self, WindowError> {
        let span = active.span_secs();
        if window_length == 0 || span == 0 || span % window_length != 0 {
            return Err(WindowError::UnevenPartition {
                span,
                window_length,
            });
        }
        Ok(Self {
            active,
            window_length,
        })
    }

    pub fn active_window(&self) -> ActiveWindow {
        self.active
    }

    pub fn window_length(&self) -> u32 {
        self.window_length
    }

    /// Number of windows in the partition.
    pub fn window_count(&self) -> usize {
        (self.active.span_secs() / self.window_length) as usize
    }

    /// The windows, in time order.
    pub fn windows(&self) -> impl Iterator<Item = Window> + '_ {
        let length = self.window_length;
        (0..self.window_count() as u32).map(move |i| Window {
            start_second: self.active.start_second + i * length,
            length,
        })
    }
}

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("window length {window_length}s does not evenly partition a {span}s span")]
    UnevenPartition { span: u32, window_length: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_has_64_windows() {
        let plan = WindowPlan::new(ActiveWindow::default(), 900).unwrap();
        assert_eq!(plan.window_count(), 64);
    }

    #[test]
    fn test_windows_partition_exactly() {
        let active = ActiveWindow::new(21_600, 79_200);
        let plan = WindowPlan::new(active, 900).unwrap();

        let windows: Vec<Window> = plan.windows().collect();
        assert_eq!(windows.len(), plan.window_count());
        assert_eq!(windows[0].start_second, active.start_second);

        // No overlap, no gap.
        for pair in windows.windows(2) {
            assert_eq!(pair[0].start_second + pair[0].length, pair[1].start_second);
        }
        let last = windows.last().unwrap();
        assert_eq!(last.start_second + last.length, active.end_second);
    }

    #[test]
    fn test_center_second() {
        let window = Window {
            start_second: 21_600,
            length: 900,
        };
        assert_eq!(window.center_second(), 22_050);
        assert!(window.contains(21_600));
        assert!(!window.contains(22_500));
    }

    #[test]
    fn test_uneven_partition_rejected() {
        let active = ActiveWindow::new(0, 1000);
        assert!(matches!(
            WindowPlan::new(active, 900),
            Err(WindowError::UnevenPartition { .. })
        ));
    }
}
