//! Shared utility functions for AQFR crates.

/// Date utility functions
pub mod dates {
    use chrono::{NaiveDate, TimeDelta};

    /// Prefix shared by every LCSQA E2 table name.
    pub const TABLE_PREFIX: &str = "FR_E2_";

    /// Return `date` moved forward by `days` (backwards when negative).
    ///
    /// `None` when the result falls outside the representable calendar.
    pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
        date.checked_add_signed(TimeDelta::try_days(days)?)
    }

    /// Return `date` moved backwards by `days`.
    pub fn sub_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
        date.checked_sub_signed(TimeDelta::try_days(days)?)
    }

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Format a NaiveDate as "DD-MM-YYYY", used in chart titles.
    pub fn format_date_fr(date: &NaiveDate) -> String {
        date.format("%d-%m-%Y").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
    }

    /// Number of elapsed days from `begin` to `date`.
    ///
    /// Negative when `date` precedes `begin`. Month and year boundaries are
    /// counted as ordinary days.
    pub fn day_offset(begin: &NaiveDate, date: &NaiveDate) -> i64 {
        (*date - *begin).num_days()
    }

    /// Name of the raw measurement file published for `date`.
    pub fn raw_table_name(date: &NaiveDate) -> String {
        format!("{}{}.csv", TABLE_PREFIX, format_date(date))
    }

    /// Name of the processed per-station table for `date`.
    pub fn day_table_name(date: &NaiveDate) -> String {
        format!("{}{}_processed.csv", TABLE_PREFIX, format_date(date))
    }

}

/// Geographic helpers
pub mod geo {
    /// Mean earth radius in kilometres.
    pub const EARTH_RADIUS_KM: f64 = 6371.0088;

    /// Great-circle distance in kilometres between two (latitude, longitude)
    /// points given in decimal degrees.
    pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
        let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
        let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
        let dlat = lat2 - lat1;
        let dlon = lon2 - lon1;
        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
    }

    /// Convert a degrees/minutes/seconds string such as `48°43'23"` or
    /// `-0°22'14"` to decimal degrees.
    ///
    /// The sign comes from a leading `-`; the first three digit groups are
    /// read as degrees, minutes and seconds. Returns `None` when fewer than
    /// three groups are present.
    pub fn dms_to_decimal(dms: &str) -> Option<f64> {
        let trimmed = dms.trim();
        let sign = if trimmed.starts_with('-') { -1.0 } else { 1.0 };
        let groups: Vec<f64> = trimmed
            .split(|c: char| !c.is_ascii_digit())
            .filter(|s| !s.is_empty())
            .take(3)
            .map(|s| s.parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;
        if groups.len() < 3 {
            return None;
        }
        Some(sign * (groups[0] + groups[1] / 60.0 + groups[2] / 3600.0))
    }

}
