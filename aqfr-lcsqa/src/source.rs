//! Backing stores for processed day tables.
//!
//! A range is only usable as a whole: [`load_range`] stops at the first day
//! that cannot be loaded and reports it as [`AqError::ResourceUnavailable`].

use crate::date_range::DateRange;
use crate::error::{AqError, Result};
use crate::measurement::{DailyMeasurement, DayTable};
use aqfr_utils::dates::day_table_name;
use chrono::NaiveDate;
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Anything that can hand out the processed table of one calendar day.
pub trait DayTableSource {
    fn load_day(&self, date: NaiveDate) -> Result<DayTable>;
}

impl<S: DayTableSource + ?Sized> DayTableSource for &S {
    fn load_day(&self, date: NaiveDate) -> Result<DayTable> {
        (**self).load_day(date)
    }
}

/// Reads `FR_E2_<date>_processed.csv` files from a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySource { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: &NaiveDate) -> PathBuf {
        self.dir.join(day_table_name(date))
    }
}

impl DayTableSource for DirectorySource {
    fn load_day(&self, date: NaiveDate) -> Result<DayTable> {
        let path = self.path_for(&date);
        let unavailable = |reason: String| AqError::ResourceUnavailable { date, reason };
        let content = std::fs::read_to_string(&path)
            .map_err(|e| unavailable(format!("{}: {}", path.display(), e)))?;
        let table = DayTable::parse_csv(date, &content)
            .map_err(|e| unavailable(format!("{}: {}", path.display(), e)))?;
        debug!("source: loaded {} rows from {}", table.rows.len(), path.display());
        Ok(table)
    }
}

/// Day tables held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    days: HashMap<NaiveDate, Vec<DailyMeasurement>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, rows: Vec<DailyMeasurement>) {
        self.days.insert(date, rows);
    }

    pub fn remove(&mut self, date: &NaiveDate) -> Option<Vec<DailyMeasurement>> {
        self.days.remove(date)
    }
}

impl DayTableSource for MemorySource {
    fn load_day(&self, date: NaiveDate) -> Result<DayTable> {
        self.days
            .get(&date)
            .map(|rows| DayTable::new(date, rows.clone()))
            .ok_or_else(|| AqError::ResourceUnavailable {
                date,
                reason: "no table for this day".to_string(),
            })
    }
}

/// Load every day of `range` in chronological order.
pub fn load_range<S: DayTableSource>(source: &S, range: DateRange) -> Result<Vec<DayTable>> {
    let mut tables = Vec::new();
    for date in range {
        tables.push(source.load_day(date)?);
    }
    info!(
        "source: loaded {} day tables from {} to {}",
        tables.len(),
        range.0,
        range.1
    );
    Ok(tables)
}
