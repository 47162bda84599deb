//! Download and processing of LCSQA daily files.

use anyhow::Context;
use aqfr_data::processing::process_file;
use aqfr_lcsqa::api::LcsqaClient;
use aqfr_lcsqa::date_range::DateRange;
use aqfr_lcsqa::error::AqError;
use aqfr_lcsqa::station::StationRegistry;
use aqfr_utils::dates::raw_table_name;
use chrono::{Local, NaiveDate};
use log::info;
use std::path::{Path, PathBuf};

/// Check `begin <= end <= today` and build the range.
pub fn validate_range(
    begin: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> aqfr_lcsqa::Result<DateRange> {
    if begin > end {
        return Err(AqError::InvalidDateRange(format!(
            "begin date {begin} is after end date {end}"
        )));
    }
    if end > today {
        return Err(AqError::InvalidDateRange(format!(
            "end date {end} is in the future"
        )));
    }
    Ok(DateRange(begin, end))
}

pub fn load_registry(stations_csv: &Path) -> anyhow::Result<StationRegistry> {
    let content = std::fs::read_to_string(stations_csv)
        .with_context(|| format!("reading stations CSV {}", stations_csv.display()))?;
    Ok(StationRegistry::parse_csv(&content)?)
}

/// Download every raw day of `[begin, end]` into `data_dir`.
///
/// Stops at the first day the server does not publish.
pub async fn run_fetch(begin: NaiveDate, end: NaiveDate, data_dir: &Path) -> anyhow::Result<()> {
    let today = Local::now().naive_local().date();
    let range = validate_range(begin, end, today)?;
    tokio::fs::create_dir_all(data_dir).await?;

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .build()?;
    let lcsqa = LcsqaClient::new(client);

    info!("Fetching {} days from {} to {}", range.len_days(), begin, end);
    for date in range {
        let body = lcsqa.fetch_raw_day(date).await?;
        let path = data_dir.join(raw_table_name(&date));
        tokio::fs::write(&path, body).await?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}

/// Process the raw files of `range` found in `data_dir`.
pub fn process_range(
    data_dir: &Path,
    range: DateRange,
    registry: &StationRegistry,
    remove_raw: bool,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for date in range {
        let raw_path = data_dir.join(raw_table_name(&date));
        let output = process_file(&raw_path, date, registry)?;
        if remove_raw {
            std::fs::remove_file(&raw_path)
                .with_context(|| format!("removing {}", raw_path.display()))?;
        }
        written.push(output);
    }
    Ok(written)
}

pub fn run_process(
    begin: NaiveDate,
    end: NaiveDate,
    data_dir: &Path,
    stations_csv: &Path,
    remove_raw: bool,
) -> anyhow::Result<()> {
    let today = Local::now().naive_local().date();
    let range = validate_range(begin, end, today)?;
    let registry = load_registry(stations_csv)?;
    let written = process_range(data_dir, range, &registry, remove_raw)?;
    info!("Processing complete: {} day tables", written.len());
    Ok(())
}
