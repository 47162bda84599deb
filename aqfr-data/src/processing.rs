//! Raw LCSQA E2 export → processed per-station day table.

use aqfr_lcsqa::error::{AqError, Result};
use aqfr_lcsqa::measurement::{DailyMeasurement, DayTable, RawReading};
use aqfr_lcsqa::pollutant::grade;
use aqfr_lcsqa::station::StationRegistry;
use chrono::NaiveDate;
use log::{debug, info};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Hourly values collected for one station and pollutant.
#[derive(Debug, Default)]
struct PollutantValues {
    values: Vec<f64>,
    unit: String,
}

#[derive(Debug)]
struct StationValues {
    name: String,
    pollutants: Vec<(String, PollutantValues)>,
}

impl StationValues {
    fn pollutant_mut(&mut self, pollutant: &str) -> &mut PollutantValues {
        let idx = match self.pollutants.iter().position(|(p, _)| p == pollutant) {
            Some(idx) => idx,
            None => {
                self.pollutants
                    .push((pollutant.to_string(), PollutantValues::default()));
                self.pollutants.len() - 1
            }
        };
        &mut self.pollutants[idx].1
    }
}

/// Daily statistics of a set of hourly values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub mean: f64,
    pub median: f64,
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
}

/// Round to three decimals.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

impl Stats {
    /// `None` for an empty slice. The standard deviation is the sample
    /// deviation, zero for a single value.
    pub fn compute(values: &[f64]) -> Option<Stats> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };
        let stdev = if values.len() > 1 {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        } else {
            0.0
        };
        Some(Stats {
            mean: round3(mean),
            median: round3(median),
            stdev: round3(stdev),
            min: round3(sorted[0]),
            max: round3(sorted[sorted.len() - 1]),
        })
    }
}

/// Summarize raw readings into one row per station and pollutant.
///
/// Readings from stations missing in `registry` are dropped, as are empty
/// and negative values. The unit is the last one seen for the pair.
pub fn summarize(readings: &[RawReading], registry: &StationRegistry) -> Vec<DailyMeasurement> {
    let mut order: Vec<String> = Vec::new();
    let mut stations: HashMap<String, StationValues> = HashMap::new();
    let mut unknown: BTreeMap<&str, usize> = BTreeMap::new();

    for reading in readings {
        if !registry.contains(&reading.station_id) {
            *unknown.entry(reading.station_id.as_str()).or_default() += 1;
            continue;
        }
        let station = stations
            .entry(reading.station_id.clone())
            .or_insert_with(|| {
                order.push(reading.station_id.clone());
                StationValues {
                    name: reading.station_name.clone(),
                    pollutants: Vec::new(),
                }
            });
        if let Some(value) = reading.value.filter(|_| reading.is_valid()) {
            let entry = station.pollutant_mut(&reading.pollutant);
            entry.values.push(value);
            entry.unit = reading.unit.clone();
        }
    }
    if !unknown.is_empty() {
        debug!("processing: skipped readings of {} unknown stations", unknown.len());
    }

    let mut rows = Vec::new();
    for station_id in &order {
        let Some(station) = stations.get(station_id) else {
            continue;
        };
        for (pollutant, values) in &station.pollutants {
            let Some(stats) = Stats::compute(&values.values) else {
                continue;
            };
            rows.push(DailyMeasurement {
                id: station_id.clone(),
                name: station.name.clone(),
                pollutant: pollutant.clone(),
                mean: stats.mean,
                median: stats.median,
                stdev: stats.stdev,
                min: stats.min,
                max: stats.max,
                unit: values.unit.clone(),
                note: grade(pollutant, stats.mean, stats.max),
            });
        }
    }
    rows
}

/// Path of the processed table written next to a raw file:
/// `FR_E2_2022-02-15.csv` → `FR_E2_2022-02-15_processed.csv`.
pub fn processed_path(raw_path: &Path) -> PathBuf {
    let stem = raw_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    raw_path.with_file_name(format!("{stem}_processed.csv"))
}

/// Process the raw file for `date` and write its processed table.
pub fn process_file(
    raw_path: &Path,
    date: NaiveDate,
    registry: &StationRegistry,
) -> Result<PathBuf> {
    let content = std::fs::read_to_string(raw_path).map_err(|e| AqError::ResourceUnavailable {
        date,
        reason: format!("{}: {}", raw_path.display(), e),
    })?;
    let readings = RawReading::parse_e2(&content)?;
    let table = DayTable::new(date, summarize(&readings, registry));
    let output = processed_path(raw_path);
    std::fs::write(&output, table.to_csv()?)?;
    info!(
        "processing: {} readings -> {} rows in {}",
        readings.len(),
        table.rows.len(),
        output.display()
    );
    Ok(output)
}
