//! Per-station aggregation of a trailing range of day tables.
//!
//! For a station, an end date and a day range `k`, every pollutant seen in
//! `[end - k, end]` gets three sequences (min, mean, max) of exactly `k + 1`
//! entries, indexed by elapsed days from the first day. Days without a
//! reading hold `None`.

use aqfr_lcsqa::date_range::DateRange;
use aqfr_lcsqa::error::{AqError, Result};
use aqfr_lcsqa::measurement::{DailyMeasurement, DayTable};
use aqfr_lcsqa::source::{load_range, DayTableSource};
use aqfr_utils::dates::{day_offset, format_date_fr};
use chrono::NaiveDate;
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;

/// Min/mean/max sequences for one pollutant, one entry per day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutantSeries {
    pub min: Vec<Option<f64>>,
    pub mean: Vec<Option<f64>>,
    pub max: Vec<Option<f64>>,
}

impl PollutantSeries {
    fn absent(len: usize) -> Self {
        PollutantSeries {
            min: vec![None; len],
            mean: vec![None; len],
            max: vec![None; len],
        }
    }

    fn set(&mut self, offset: usize, row: &DailyMeasurement) {
        self.min[offset] = Some(row.min);
        self.mean[offset] = Some(row.mean);
        self.max[offset] = Some(row.max);
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

/// End-date mean and unit of a pollutant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutantSummary {
    pub mean: f64,
    pub unit: String,
}

/// A clicked point of the line chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayPoint {
    pub date: NaiveDate,
    pub mean: Option<f64>,
    pub max: Option<f64>,
}

/// Chart-ready view of one station over a day range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationAggregate {
    pub station_id: String,
    pub begin: NaiveDate,
    pub end: NaiveDate,
    /// One date per sequence index.
    pub days: Vec<NaiveDate>,
    /// Pollutants in the order they were first seen.
    pub pollutant_names: Vec<String>,
    pub series: BTreeMap<String, PollutantSeries>,
    /// Notes reported on the end date, by pollutant.
    pub grades: BTreeMap<String, u8>,
    /// Highest end-date note; `None` when nothing was reported that day.
    pub day_grade: Option<u8>,
    pub summary: BTreeMap<String, PollutantSummary>,
}

impl StationAggregate {
    pub fn len_days(&self) -> usize {
        self.days.len()
    }

    pub fn series_for(&self, pollutant: &str) -> Option<&PollutantSeries> {
        self.series.get(pollutant)
    }

    /// Date, mean and max of `pollutant` at sequence index `offset`.
    pub fn point(&self, pollutant: &str, offset: usize) -> Option<DayPoint> {
        let series = self.series.get(pollutant)?;
        let date = *self.days.get(offset)?;
        Some(DayPoint {
            date,
            mean: series.mean[offset],
            max: series.max[offset],
        })
    }

    /// `Données du <begin> au <end>` x-axis caption.
    pub fn range_caption(&self) -> String {
        format!(
            "Données du {} au {}",
            format_date_fr(&self.begin),
            format_date_fr(&self.end)
        )
    }
}

/// Load `[end - day_range, end]` from `source` and aggregate it for
/// `station_id`.
///
/// Fails with [`AqError::ResourceUnavailable`] when any day is missing,
/// including days before the earliest representable date, and with
/// [`AqError::StationNotReported`] when the station has no row at all.
pub fn aggregate_station<S: DayTableSource>(
    source: &S,
    station_id: &str,
    end: NaiveDate,
    day_range: u32,
) -> Result<StationAggregate> {
    let range = DateRange::trailing(end, day_range).ok_or_else(|| {
        AqError::ResourceUnavailable {
            date: end,
            reason: format!("a {day_range}-day range starts before the earliest date"),
        }
    })?;
    let tables = load_range(source, range)?;
    aggregate_tables(station_id, range, &tables)
}

/// Aggregate already loaded tables covering `range`.
///
/// A later row for the same station, pollutant and day overwrites an earlier one.
pub fn aggregate_tables(
    station_id: &str,
    range: DateRange,
    tables: &[DayTable],
) -> Result<StationAggregate> {
    let DateRange(begin, end) = range;
    let days: Vec<NaiveDate> = range.collect();
    let len = days.len();

    let mut pollutant_names: Vec<String> = Vec::new();
    let mut series: BTreeMap<String, PollutantSeries> = BTreeMap::new();
    let mut grades: BTreeMap<String, u8> = BTreeMap::new();
    let mut summary: BTreeMap<String, PollutantSummary> = BTreeMap::new();
    let mut reported = false;

    for table in tables {
        let offset = day_offset(&begin, &table.date);
        if offset < 0 || offset as usize >= len {
            continue;
        }
        let offset = offset as usize;
        for row in table.for_station(station_id) {
            reported = true;
            if !series.contains_key(&row.pollutant) {
                pollutant_names.push(row.pollutant.clone());
                series.insert(row.pollutant.clone(), PollutantSeries::absent(len));
            }
            if let Some(s) = series.get_mut(&row.pollutant) {
                s.set(offset, row);
            }
            if table.date == end {
                grades.insert(row.pollutant.clone(), row.note);
                summary.insert(
                    row.pollutant.clone(),
                    PollutantSummary {
                        mean: row.mean,
                        unit: row.unit.clone(),
                    },
                );
            }
        }
    }

    if !reported {
        return Err(AqError::StationNotReported {
            station_id: station_id.to_string(),
            begin,
            end,
        });
    }

    let day_grade = grades.values().copied().max();
    info!(
        "aggregate: {} from {} to {}: {} pollutants, day grade {:?}",
        station_id,
        begin,
        end,
        pollutant_names.len(),
        day_grade
    );

    Ok(StationAggregate {
        station_id: station_id.to_string(),
        begin,
        end,
        days,
        pollutant_names,
        series,
        grades,
        day_grade,
        summary,
    })
}
