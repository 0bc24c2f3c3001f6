//! CSV glue for the raw input files.
//!
//! Deliberately thin: the loaders translate files into the raw tables of
//! [`crate::align`] and nothing else. Occupancy files carry one row per
//! day (date, then one state cell per second); power files carry one day
//! each, one line per second with at least four columns of which only
//! the power column is consumed.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::align::{parse_day, OccupancyRow, OccupancyTable, PhaseTable};
use crate::series::{Channel, SECONDS_PER_DAY};

/// Zero-based index of the power column in a phase file line
/// (current, voltage, phase shift, power).
const POWER_COLUMN: usize = 3;

/// Load one seasonal occupancy CSV.
pub fn load_occupancy_csv(path: &Path) -> Result<OccupancyTable> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading occupancy file {}", path.display()))?;

    let mut rows = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut cells = line.split(',');
        let date_cell = cells.next().unwrap_or_default().trim();
        let day = parse_day(date_cell)
            .with_context(|| format!("{}:{}: bad date cell", path.display(), line_no + 1))?;

        let states: Vec<Option<f64>> = cells
            .map(|cell| {
                let cell = cell.trim();
                if cell.is_empty() {
                    Ok(None)
                } else {
                    cell.parse::<f64>().map(Some).with_context(|| {
                        format!("{}:{}: bad occupancy cell {cell:?}", path.display(), line_no + 1)
                    })
                }
            })
            .collect::<Result<_>>()?;
        rows.push(OccupancyRow { day, states });
    }

    debug!(path = %path.display(), days = rows.len(), "loaded occupancy table");
    OccupancyTable::from_rows(rows)
        .with_context(|| format!("building occupancy table from {}", path.display()))
}

/// Load a directory of per-day files for one power phase. File stems are
/// the day (`2012-06-01.csv`); each line is one second's reading.
pub fn load_phase_dir(dir: &Path, channel: Channel) -> Result<PhaseTable> {
    let mut table = PhaseTable::new(channel);

    let mut entries: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("reading phase directory {}", dir.display()))?
        .collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let day = parse_day(stem)
            .with_context(|| format!("{}: file stem is not a date", path.display()))?;

        let watts = load_phase_file(&path)?;
        table
            .insert_day(day, watts)
            .with_context(|| format!("inserting {}", path.display()))?;
    }

    debug!(dir = %dir.display(), channel = %channel, days = table.len(), "loaded phase table");
    Ok(table)
}

fn load_phase_file(path: &Path) -> Result<Vec<f64>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let mut watts = Vec::with_capacity(SECONDS_PER_DAY as usize);
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let columns: Vec<&str> = line.split(',').collect();
        if columns.len() <= POWER_COLUMN {
            bail!(
                "{}:{}: expected at least {} columns, got {}",
                path.display(),
                line_no + 1,
                POWER_COLUMN + 1,
                columns.len()
            );
        }
        let value: f64 = columns[POWER_COLUMN].trim().parse().with_context(|| {
            format!("{}:{}: bad power value", path.display(), line_no + 1)
        })?;
        watts.push(value);
    }
    Ok(watts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("wattwitness-loader-{name}"));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_occupancy_row_parsing() {
        let mut line = String::from("01-Jun-2012");
        for i in 0..SECONDS_PER_DAY {
            // One empty cell to exercise the gap path.
            if i == 5 {
                line.push(',');
            } else {
                line.push_str(",1");
            }
        }
        let path = temp_file("occupancy.csv", &line);
        let table = load_occupancy_csv(&path).unwrap();
        assert_eq!(table.len(), 1);
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_occupancy_bad_date_is_error() {
        let path = temp_file("bad-date.csv", "not-a-date,1,0\n");
        assert!(load_occupancy_csv(&path).is_err());
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_phase_file_takes_power_column() {
        let content = "1.2,230.1,0.9,55.5\n1.3,230.0,0.9,-1\n";
        let path = temp_file("phase.csv", content);
        let watts = load_phase_file(&path).unwrap();
        assert_eq!(watts, vec![55.5, -1.0]);
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_phase_file_rejects_short_lines() {
        let path = temp_file("short.csv", "1.2,230.1\n");
        assert!(load_phase_file(&path).is_err());
        fs::remove_file(path).ok();
    }
}
