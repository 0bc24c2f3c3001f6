//! Alignment of raw occupancy and power tables onto a common day axis.
//!
//! The occupancy table drives day selection: a calendar day enters the
//! pipeline only if labeled occupancy exists for it and all three power
//! phases carry a trace for the same day. Days missing a phase are
//! dropped with a warning, never a hard failure. Every surviving series
//! is trimmed to the half-open active window `[start, end)`, applied
//! identically to occupancy and power.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

use crate::config::ActiveWindow;
use crate::series::{Channel, DaySeries, SECONDS_PER_DAY};

/// Date formats accepted from the raw sources. Both normalize to
/// [`NaiveDate`] so days from different files compare directly.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d-%b-%Y"];

/// Parse a source date string in either supported format.
pub fn parse_day(s: &str) -> Result<NaiveDate, AlignError> {
    for format in DATE_FORMATS {
        if let Ok(day) = NaiveDate::parse_from_str(s, format) {
            return Ok(day);
        }
    }
    Err(AlignError::BadDate(s.to_string()))
}

/// One raw occupancy row: a full day of fine-grained states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyRow {
    pub day: NaiveDate,
    /// One state per second of day; `None` where the tablet recorded nothing.
    pub states: Vec<Option<f64>>,
}

/// Merged occupancy observations, keyed by calendar day.
#[derive(Debug, Clone, Default)]
pub struct OccupancyTable {
    days: BTreeMap<NaiveDate, Vec<Option<f64>>>,
}

impl OccupancyTable {
    /// Build a table from one seasonal source, rejecting duplicate days.
    pub fn from_rows(rows: Vec<OccupancyRow>) -> Result<Self, AlignError> {
        let mut table = Self::default();
        for row in rows {
            table.insert_row(row)?;
        }
        Ok(table)
    }

    /// Merge two seasonal tables. A day present in both is ambiguous and
    /// rejected outright.
    pub fn merge(first: Self, second: Self) -> Result<Self, AlignError> {
        let mut merged = first;
        for (day, states) in second.days {
            merged.insert_row(OccupancyRow { day, states })?;
        }
        Ok(merged)
    }

    fn insert_row(&mut self, row: OccupancyRow) -> Result<(), AlignError> {
        if row.states.len() != SECONDS_PER_DAY as usize {
            return Err(AlignError::WrongSampleCount {
                day: row.day,
                channel: Channel::Occupancy,
                got: row.states.len(),
            });
        }
        if self.days.contains_key(&row.day) {
            return Err(AlignError::DuplicateDay(row.day));
        }
        self.days.insert(row.day, row.states);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn days(&self) -> impl Iterator<Item = &NaiveDate> {
        self.days.keys()
    }
}

/// Raw per-day traces of a single power phase.
#[derive(Debug, Clone)]
pub struct PhaseTable {
    channel: Channel,
    days: BTreeMap<NaiveDate, Vec<f64>>,
}

impl PhaseTable {
    pub fn new(channel: Channel) -> Self {
        debug_assert!(channel.is_power());
        Self {
            channel,
            days: BTreeMap::new(),
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Insert one day of watt readings (sentinel `-1` for gaps).
    pub fn insert_day(&mut self, day: NaiveDate, watts: Vec<f64>) -> Result<(), AlignError> {
        if watts.len() != SECONDS_PER_DAY as usize {
            return Err(AlignError::WrongSampleCount {
                day,
                channel: self.channel,
                got: watts.len(),
            });
        }
        if self.days.insert(day, watts).is_some() {
            return Err(AlignError::DuplicateDay(day));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    fn get(&self, day: &NaiveDate) -> Option<&[f64]> {
        self.days.get(day).map(Vec::as_slice)
    }
}

/// All four aligned series of one surviving day.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedDay {
    pub day: NaiveDate,
    pub p1: DaySeries,
    pub p2: DaySeries,
    pub p3: DaySeries,
    pub occupancy: DaySeries,
}

impl AlignedDay {
    pub fn power_phase(&self, channel: Channel) -> &DaySeries {
        match channel {
            Channel::Phase1 => &self.p1,
            Channel::Phase2 => &self.p2,
            Channel::Phase3 => &self.p3,
            Channel::Occupancy => &self.occupancy,
        }
    }
}

/// Align the occupancy table with the three phase tables, trimming every
/// series to `active`. Days missing from any phase table are dropped
/// with a warning and do not appear in the output.
///
/// The active window must lie within the day; an empty or overrunning
/// window is rejected rather than sliced out of bounds, so library
/// callers bypassing [`PipelineConfig::validate`](crate::config::PipelineConfig::validate)
/// still get an error instead of a panic.
pub fn align(
    occupancy: &OccupancyTable,
    phases: [&PhaseTable; 3],
    active: ActiveWindow,
) -> Result<BTreeMap<NaiveDate, AlignedDay>, AlignError> {
    if active.span_secs() == 0 || active.end_second > SECONDS_PER_DAY {
        return Err(AlignError::InvalidActiveWindow {
            start: active.start_second,
            end: active.end_second,
        });
    }
    let start = active.start_second as usize;
    let end = active.end_second as usize;

    let mut aligned = BTreeMap::new();
    'days: for (&day, states) in &occupancy.days {
        let mut trimmed = Vec::with_capacity(3);
        for phase in phases {
            match phase.get(&day) {
                Some(watts) => {
                    trimmed.push(DaySeries::from_power(
                        day,
                        phase.channel(),
                        active.start_second,
                        &watts[start..end],
                    ));
                }
                None => {
                    warn!(%day, channel = %phase.channel(), "day missing from power source, dropping");
                    continue 'days;
                }
            }
        }
        let occupancy_series =
            DaySeries::from_occupancy(day, active.start_second, &states[start..end]);

        let mut trimmed = trimmed.into_iter();
        aligned.insert(
            day,
            AlignedDay {
                day,
                p1: trimmed.next().expect("three phases"),
                p2: trimmed.next().expect("three phases"),
                p3: trimmed.next().expect("three phases"),
                occupancy: occupancy_series,
            },
        );
    }
    Ok(aligned)
}

/// Alignment errors. Only malformed input tables are hard failures;
/// cross-source day mismatches degrade to dropped days.
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("unparseable date {0:?}")]
    BadDate(String),

    #[error("active window [{start}, {end}) is empty or overruns the day")]
    InvalidActiveWindow { start: u32, end: u32 },

    #[error("day {0} appears in more than one source")]
    DuplicateDay(NaiveDate),

    #[error("day {day} channel {channel} has {got} samples, expected 86400")]
    WrongSampleCount {
        day: NaiveDate,
        channel: Channel,
        got: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn occupancy_row(day: &str, state: f64) -> OccupancyRow {
        OccupancyRow {
            day: date(day),
            states: vec![Some(state); SECONDS_PER_DAY as usize],
        }
    }

    fn phase_with_day(channel: Channel, day: &str, watts: f64) -> PhaseTable {
        let mut table = PhaseTable::new(channel);
        table
            .insert_day(date(day), vec![watts; SECONDS_PER_DAY as usize])
            .unwrap();
        table
    }

    #[test]
    fn test_parse_day_both_formats() {
        assert_eq!(parse_day("2012-06-01").unwrap(), date("2012-06-01"));
        assert_eq!(parse_day("01-Jun-2012").unwrap(), date("2012-06-01"));
        assert!(matches!(parse_day("June 1st"), Err(AlignError::BadDate(_))));
    }

    #[test]
    fn test_merge_rejects_overlapping_days() {
        let summer = OccupancyTable::from_rows(vec![occupancy_row("2012-06-01", 1.0)]).unwrap();
        let winter = OccupancyTable::from_rows(vec![occupancy_row("2012-06-01", 0.0)]).unwrap();
        assert!(matches!(
            OccupancyTable::merge(summer, winter),
            Err(AlignError::DuplicateDay(_))
        ));
    }

    #[test]
    fn test_merge_disjoint_days() {
        let summer = OccupancyTable::from_rows(vec![occupancy_row("2012-06-01", 1.0)]).unwrap();
        let winter = OccupancyTable::from_rows(vec![occupancy_row("2012-12-01", 0.0)]).unwrap();
        let merged = OccupancyTable::merge(summer, winter).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_wrong_sample_count_rejected() {
        let mut table = PhaseTable::new(Channel::Phase1);
        assert!(matches!(
            table.insert_day(date("2012-06-01"), vec![0.0; 100]),
            Err(AlignError::WrongSampleCount { got: 100, .. })
        ));
    }

    #[test]
    fn test_day_missing_from_phase_is_dropped() {
        let occupancy = OccupancyTable::from_rows(vec![
            occupancy_row("2012-06-01", 1.0),
            occupancy_row("2012-06-02", 0.0),
        ])
        .unwrap();
        let p1 = phase_with_day(Channel::Phase1, "2012-06-01", 40.0);
        let p2 = phase_with_day(Channel::Phase2, "2012-06-01", 41.0);
        // Phase 3 only has the second day, so neither day survives... p3
        // is missing 06-01 and p1/p2 are missing 06-02.
        let p3 = phase_with_day(Channel::Phase3, "2012-06-02", 42.0);

        let aligned = align(&occupancy, [&p1, &p2, &p3], ActiveWindow::default()).unwrap();
        assert!(aligned.is_empty());
    }

    #[test]
    fn test_overrunning_active_window_rejected() {
        let occupancy = OccupancyTable::from_rows(vec![occupancy_row("2012-06-01", 1.0)]).unwrap();
        let p1 = phase_with_day(Channel::Phase1, "2012-06-01", 40.0);
        let p2 = phase_with_day(Channel::Phase2, "2012-06-01", 41.0);
        let p3 = phase_with_day(Channel::Phase3, "2012-06-01", 42.0);

        for window in [
            ActiveWindow::new(0, SECONDS_PER_DAY + 1),
            ActiveWindow::new(21_600, 21_600),
        ] {
            assert!(matches!(
                align(&occupancy, [&p1, &p2, &p3], window),
                Err(AlignError::InvalidActiveWindow { .. })
            ));
        }
    }

    #[test]
    fn test_aligned_day_trimmed_to_active_window() {
        let occupancy = OccupancyTable::from_rows(vec![occupancy_row("2012-06-01", 1.0)]).unwrap();
        let p1 = phase_with_day(Channel::Phase1, "2012-06-01", 40.0);
        let p2 = phase_with_day(Channel::Phase2, "2012-06-01", 41.0);
        let p3 = phase_with_day(Channel::Phase3, "2012-06-01", 42.0);

        let active = ActiveWindow::default();
        let aligned = align(&occupancy, [&p1, &p2, &p3], active).unwrap();
        let day = aligned.get(&date("2012-06-01")).unwrap();

        assert_eq!(day.p1.len() as u32, active.span_secs());
        assert_eq!(day.occupancy.len() as u32, active.span_secs());
        assert_eq!(day.p1.start_second, active.start_second);
        assert_eq!(day.occupancy.start_second, active.start_second);
    }
}
