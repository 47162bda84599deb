//! Read-only views over the processed day tables.

use crate::ingest::load_registry;
use aqfr_data::heatmap::heat_map;
use aqfr_data::session::{Outcome, ViewState};
use aqfr_lcsqa::source::{DayTableSource, DirectorySource};
use aqfr_lcsqa::station::StationRegistry;
use chrono::NaiveDate;
use log::info;
use std::fmt::Write;
use std::path::Path;

pub const NO_DATA: &str = "no data found";

/// Indented county / city / station listing, optionally filtered on county.
pub fn format_station_tree(registry: &StationRegistry, county: Option<&str>) -> String {
    let filter = county.map(str::to_lowercase);
    let mut out = String::new();
    for (county_name, cities) in registry.by_county() {
        if let Some(term) = &filter {
            if !county_name.to_lowercase().contains(term.as_str()) {
                continue;
            }
        }
        let _ = writeln!(out, "{county_name}");
        for (city, ids) in cities {
            let _ = writeln!(out, "  {city}");
            for id in ids {
                let _ = writeln!(out, "    {id}");
            }
        }
    }
    out
}

pub fn run_stations(stations_csv: &Path, county: Option<&str>) -> anyhow::Result<()> {
    let registry = load_registry(stations_csv)?;
    print!("{}", format_station_tree(&registry, county));
    Ok(())
}

/// JSON aggregate of `station_id`, or [`NO_DATA`].
pub fn station_report<S: DayTableSource>(
    source: &S,
    registry: &StationRegistry,
    station_id: &str,
    date: NaiveDate,
    range: u32,
) -> anyhow::Result<String> {
    let station = registry.require(station_id)?;
    let mut state = ViewState::new(date);
    state.day_range = range;
    state.show_station(source, station_id)?;
    match state.outcome() {
        Some(Outcome::Chart(aggregate)) => {
            info!("{}: {}", state.title(station), state.interpretation(station));
            Ok(serde_json::to_string_pretty(aggregate)?)
        }
        _ => Ok(NO_DATA.to_string()),
    }
}

pub fn run_station(
    station_id: &str,
    date: NaiveDate,
    range: u32,
    data_dir: &Path,
    stations_csv: &Path,
) -> anyhow::Result<()> {
    let registry = load_registry(stations_csv)?;
    let source = DirectorySource::new(data_dir);
    println!("{}", station_report(&source, &registry, station_id, date, range)?);
    Ok(())
}

pub fn run_heatmap(date: NaiveDate, data_dir: &Path, stations_csv: &Path) -> anyhow::Result<()> {
    let registry = load_registry(stations_csv)?;
    let source = DirectorySource::new(data_dir);
    let map = heat_map(&source, &registry, date)?;
    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqfr_lcsqa::measurement::DailyMeasurement;
    use aqfr_lcsqa::source::MemorySource;

    const STATIONS_CSV: &str = "\
Station ID,Latitude,Longitude,Airport,City,County #,County Name
FR04002,48.8283,2.3597,Paris-Orly,Paris,75,Paris
FR03043,43.3050,5.3948,,Marseille,13,Bouches-du-Rhône
FR03080,43.2990,5.3700,,Marseille,13,Bouches-du-Rhône
";

    fn row(pollutant: &str, mean: f64) -> DailyMeasurement {
        DailyMeasurement {
            id: "FR04002".to_string(),
            name: "Paris 13eme".to_string(),
            pollutant: pollutant.to_string(),
            mean,
            median: mean,
            stdev: 0.0,
            min: mean,
            max: mean,
            unit: "µg-m3".to_string(),
            note: 1,
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 2, d).unwrap()
    }

    #[test]
    fn test_format_station_tree() {
        let registry = StationRegistry::parse_csv(STATIONS_CSV).unwrap();
        let all = format_station_tree(&registry, None);
        assert_eq!(
            all,
            "Bouches-du-Rhône\n  Marseille\n    FR03043\n    FR03080\nParis\n  Paris\n    FR04002\n"
        );
        let paris = format_station_tree(&registry, Some("PAR"));
        assert_eq!(paris, "Paris\n  Paris\n    FR04002\n");
    }

    #[test]
    fn test_station_report() {
        let registry = StationRegistry::parse_csv(STATIONS_CSV).unwrap();
        let mut source = MemorySource::new();
        source.insert(date(14), vec![row("NO2", 20.0)]);
        source.insert(date(15), vec![row("NO2", 25.0)]);

        let json = station_report(&source, &registry, "FR04002", date(15), 1).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["station_id"], "FR04002");
        assert_eq!(value["series"]["NO2"]["mean"][1], 25.0);

        let missing = station_report(&source, &registry, "FR04002", date(15), 3).unwrap();
        assert_eq!(missing, NO_DATA);
        let silent = station_report(&source, &registry, "FR03043", date(15), 1).unwrap();
        assert_eq!(silent, NO_DATA);
        assert!(station_report(&source, &registry, "FR99999", date(15), 1).is_err());
    }
}
