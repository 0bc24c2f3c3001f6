//! Per-day signal model.
//!
//! A [`DaySeries`] holds one calendar day of a single channel, trimmed to
//! the active window, with one slot per second. Missing samples are kept
//! as explicit gaps (`None`), never as zeros, so downstream aggregation
//! can distinguish "no reading" from "no consumption".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Seconds in a calendar day, the length of every raw input row.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Sentinel used by the power meters for a missed reading.
pub const POWER_SENTINEL: f64 = -1.0;

/// Signal channel of a day series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Phase1,
    Phase2,
    Phase3,
    Occupancy,
}

impl Channel {
    pub fn is_power(&self) -> bool {
        !matches!(self, Channel::Occupancy)
    }

    /// Short name used in logs and feature column names.
    pub fn short_name(&self) -> &'static str {
        match self {
            Channel::Phase1 => "p1",
            Channel::Phase2 => "p2",
            Channel::Phase3 => "p3",
            Channel::Occupancy => "occupancy",
        }
    }

    /// The three power phases, in feature-column order.
    pub const POWER_PHASES: [Channel; 3] = [Channel::Phase1, Channel::Phase2, Channel::Phase3];
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

/// One calendar day of one channel, trimmed to the active window.
///
/// `samples[i]` is the reading at second `start_second + i` of the day.
/// The series is immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySeries {
    pub day: NaiveDate,
    pub channel: Channel,
    /// Second of day of the first sample.
    pub start_second: u32,
    samples: Vec<Option<f64>>,
}

impl DaySeries {
    /// Build a power series from raw watt readings, mapping the meter
    /// sentinel to an explicit gap.
    pub fn from_power(day: NaiveDate, channel: Channel, start_second: u32, watts: &[f64]) -> Self {
        debug_assert!(channel.is_power());
        let samples = watts
            .iter()
            .map(|&w| {
                if (w - POWER_SENTINEL).abs() < 1e-9 {
                    None
                } else {
                    Some(w)
                }
            })
            .collect();
        Self {
            day,
            channel,
            start_second,
            samples,
        }
    }

    /// Build an occupancy series. Occupancy states are never
    /// sentinel-mapped; gaps come in as `None` from the source table.
    pub fn from_occupancy(day: NaiveDate, start_second: u32, states: &[Option<f64>]) -> Self {
        Self {
            day,
            channel: Channel::Occupancy,
            start_second,
            samples: states.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of non-absent samples.
    pub fn present_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_some()).count()
    }

    pub fn samples(&self) -> &[Option<f64>] {
        &self.samples
    }

    /// Slice of samples covering `[start_second_of_day, start + length)`.
    ///
    /// Panics if the span falls outside the series; callers derive spans
    /// from the same [`ActiveWindow`](crate::config::ActiveWindow) the
    /// series was trimmed with.
    pub fn span(&self, start_second_of_day: u32, length: u32) -> &[Option<f64>] {
        let offset = (start_second_of_day - self.start_second) as usize;
        &self.samples[offset..offset + length as usize]
    }
}
