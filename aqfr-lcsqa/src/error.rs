/// Error types for the LCSQA library
use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for station and measurement operations
#[derive(Error, Debug)]
pub enum AqError {
    /// A day's measurement table could not be loaded
    #[error("No data available for {date}: {reason}")]
    ResourceUnavailable { date: NaiveDate, reason: String },

    /// Every day of the range loaded but the station reported nothing
    #[error("Station {station_id} reported no measurement between {begin} and {end}")]
    StationNotReported {
        station_id: String,
        begin: NaiveDate,
        end: NaiveDate,
    },

    /// HTTP request failed
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Failed to read or write a table
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode a JSON response
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Begin/end dates are out of order or in the future
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Station not found
    #[error("Station not found: {0}")]
    StationNotFound(String),
}

impl AqError {
    /// True for the terminal "no data found" outcomes a chart view shows
    /// instead of a chart.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            AqError::ResourceUnavailable { .. } | AqError::StationNotReported { .. }
        )
    }
}

/// Type alias for Results using AqError
pub type Result<T> = std::result::Result<T, AqError>;
