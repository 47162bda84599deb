use aqfr_lcsqa::error::Result;
use aqfr_lcsqa::measurement::DayTable;
use aqfr_lcsqa::source::DayTableSource;
use aqfr_lcsqa::station::StationRegistry;
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// Upper end of the heat-map colour scale.
pub const HEAT_MAX: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatPoint {
    pub lat: f64,
    pub lng: f64,
    pub value: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatMap {
    pub max: u8,
    pub data: Vec<HeatPoint>,
}

/// Highest note per station in one day table.
pub fn station_grades(table: &DayTable) -> BTreeMap<&str, u8> {
    let mut grades: BTreeMap<&str, u8> = BTreeMap::new();
    for row in &table.rows {
        let grade = grades.entry(row.id.as_str()).or_insert(row.note);
        *grade = (*grade).max(row.note);
    }
    grades
}

/// Heat-map points for one day, one per station located in `registry`.
pub fn heat_map_for_table(table: &DayTable, registry: &StationRegistry) -> HeatMap {
    let mut data = Vec::new();
    for (station_id, grade) in station_grades(table) {
        match registry.get(station_id) {
            Some(station) => data.push(HeatPoint {
                lat: station.latitude,
                lng: station.longitude,
                value: grade,
            }),
            None => warn!("heatmap: station {} has no coordinates", station_id),
        }
    }
    HeatMap {
        max: HEAT_MAX,
        data,
    }
}

/// Load `date` from `source` and build its heat map.
pub fn heat_map<S: DayTableSource>(
    source: &S,
    registry: &StationRegistry,
    date: NaiveDate,
) -> Result<HeatMap> {
    let table = source.load_day(date)?;
    let map = heat_map_for_table(&table, registry);
    info!("heatmap: {} stations graded on {}", map.data.len(), date);
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqfr_lcsqa::measurement::DailyMeasurement;
    use aqfr_lcsqa::source::MemorySource;

    const STATIONS_CSV: &str = "\
Station ID,Latitude,Longitude,Airport,City,County #,County Name
FR04002,48.8283,2.3597,,Paris,75,Paris
FR03043,43.3050,5.3948,,Marseille,13,Bouches-du-Rhône
";

    fn row(id: &str, pollutant: &str, note: u8) -> DailyMeasurement {
        DailyMeasurement {
            id: id.to_string(),
            name: String::new(),
            pollutant: pollutant.to_string(),
            mean: 1.0,
            median: 1.0,
            stdev: 0.0,
            min: 1.0,
            max: 1.0,
            unit: "µg-m3".to_string(),
            note,
        }
    }

    #[test]
    fn test_heat_map_takes_station_max() {
        let date = NaiveDate::from_ymd_opt(2022, 2, 15).unwrap();
        let mut source = MemorySource::new();
        source.insert(
            date,
            vec![
                row("FR04002", "NO2", 2),
                row("FR04002", "PM10", 4),
                row("FR03043", "O3", 1),
                row("FR00000", "O3", 6),
            ],
        );
        let registry = StationRegistry::parse_csv(STATIONS_CSV).unwrap();
        let map = heat_map(&source, &registry, date).unwrap();
        assert_eq!(map.max, 5);
        assert_eq!(map.data.len(), 2);
        // BTreeMap order: FR03043 before FR04002
        assert_eq!(map.data[0].value, 1);
        assert_eq!(map.data[1].value, 4);
        assert!((map.data[1].lat - 48.8283).abs() < f64::EPSILON);
    }

    #[test]
    fn test_heat_map_missing_day() {
        let registry = StationRegistry::default();
        let date = NaiveDate::from_ymd_opt(2022, 2, 15).unwrap();
        let err = heat_map(&MemorySource::new(), &registry, date).unwrap_err();
        assert!(err.is_no_data());
    }
}
