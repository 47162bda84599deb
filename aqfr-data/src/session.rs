//! View state owned by the top-level controller.
//!
//! Each user interaction (date change, station selection, day-range change)
//! starts a request; only the result of the most recent request is installed.

use crate::aggregate::{aggregate_station, DayPoint, PollutantSeries, StationAggregate};
use crate::levels::{level_info, LevelInfo};
use aqfr_lcsqa::error::{AqError, Result};
use aqfr_lcsqa::pollutant::AirGrade;
use aqfr_lcsqa::source::DayTableSource;
use aqfr_lcsqa::station::Station;
use aqfr_utils::dates::format_date_fr;
use chrono::NaiveDate;
use log::{debug, info};
use serde::Serialize;

/// Day range used until the user picks another one.
pub const DEFAULT_DAY_RANGE: u32 = 6;

/// Identifies one aggregation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestId(u64);

/// What the station detail view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome {
    Chart(StationAggregate),
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub pollutant: String,
    pub grade: u8,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    pub active_station: Option<String>,
    pub end_date: NaiveDate,
    pub day_range: u32,
    selected: usize,
    outcome: Option<Outcome>,
    issued: u64,
}

impl ViewState {
    pub fn new(end_date: NaiveDate) -> Self {
        ViewState {
            active_station: None,
            end_date,
            day_range: DEFAULT_DAY_RANGE,
            selected: 0,
            outcome: None,
            issued: 0,
        }
    }

    /// Start a new request; any earlier request becomes stale.
    pub fn begin_request(&mut self) -> RequestId {
        self.issued += 1;
        RequestId(self.issued)
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        id.0 == self.issued
    }

    /// Install the result of request `id` unless a newer request was issued.
    ///
    /// "No data" errors become [`Outcome::NoData`]; other errors are returned
    /// and leave the state untouched. Returns whether the result was applied.
    pub fn apply(&mut self, id: RequestId, result: Result<StationAggregate>) -> Result<bool> {
        if !self.is_current(id) {
            debug!("session: discarding stale request {:?}", id);
            return Ok(false);
        }
        let outcome = match result {
            Ok(aggregate) => Outcome::Chart(aggregate),
            Err(e) if e.is_no_data() => {
                info!("session: no data found ({})", e);
                Outcome::NoData
            }
            Err(e) => return Err(e),
        };
        self.outcome = Some(outcome);
        self.selected = 0;
        Ok(true)
    }

    /// Focus `station_id` and aggregate the current date and range.
    pub fn show_station<S: DayTableSource>(
        &mut self,
        source: &S,
        station_id: &str,
    ) -> Result<bool> {
        self.active_station = Some(station_id.to_string());
        self.refresh(source)
    }

    /// Re-run the aggregation for the active station, if any.
    pub fn refresh<S: DayTableSource>(&mut self, source: &S) -> Result<bool> {
        let Some(station_id) = self.active_station.clone() else {
            return Ok(false);
        };
        let id = self.begin_request();
        let result = aggregate_station(source, &station_id, self.end_date, self.day_range);
        self.apply(id, result)
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn aggregate(&self) -> Option<&StationAggregate> {
        match &self.outcome {
            Some(Outcome::Chart(aggregate)) => Some(aggregate),
            _ => None,
        }
    }

    /// Select the pollutant at `idx` in discovery order.
    pub fn select_pollutant(&mut self, idx: usize) -> Result<&str> {
        let aggregate = self
            .aggregate()
            .ok_or_else(|| AqError::InvalidFormat("no chart to select from".to_string()))?;
        if idx >= aggregate.pollutant_names.len() {
            return Err(AqError::InvalidFormat(format!(
                "pollutant index {idx} out of range"
            )));
        }
        self.selected = idx;
        Ok(self.selected_pollutant().unwrap_or_default())
    }

    pub fn selected_pollutant(&self) -> Option<&str> {
        self.aggregate()
            .and_then(|a| a.pollutant_names.get(self.selected))
            .map(String::as_str)
    }

    pub fn selected_series(&self) -> Option<&PollutantSeries> {
        let pollutant = self.selected_pollutant()?;
        self.aggregate()?.series_for(pollutant)
    }

    /// `Évolution de la concentration de <pollutant> au cours du temps`
    pub fn chart_title(&self) -> Option<String> {
        self.selected_pollutant()
            .map(|p| format!("Évolution de la concentration de {p} au cours du temps"))
    }

    /// Point of the selected pollutant at chart index `offset`.
    pub fn clicked_point(&self, offset: usize) -> Option<DayPoint> {
        self.aggregate()?.point(self.selected_pollutant()?, offset)
    }

    /// Threshold bars for the clicked day; `None` on days without a reading.
    pub fn level_info_at(&self, offset: usize) -> Option<LevelInfo> {
        let point = self.clicked_point(offset)?;
        level_info(self.selected_pollutant()?, point.date, point.mean?, point.max?)
    }

    /// End-date grades for the contribution pie chart; empty without a day grade.
    pub fn pie_slices(&self) -> Vec<PieSlice> {
        match self.aggregate() {
            Some(aggregate) if aggregate.day_grade.is_some() => aggregate
                .grades
                .iter()
                .map(|(pollutant, grade)| PieSlice {
                    pollutant: pollutant.clone(),
                    grade: *grade,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn air_grade(&self) -> Option<AirGrade> {
        self.aggregate()?.day_grade.and_then(AirGrade::new)
    }

    /// `Station <id> (<DD-MM-YYYY>)`
    pub fn title(&self, station: &Station) -> String {
        format!("Station {} ({})", station.id, format_date_fr(&self.end_date))
    }

    /// `<pollutant> : <mean> <unit>` lines for the end date.
    pub fn day_summary(&self) -> Vec<String> {
        self.aggregate()
            .map(|a| {
                a.summary
                    .iter()
                    .map(|(pollutant, s)| format!("{} : {} {}", pollutant, s.mean, s.unit))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Grade interpretation followed by the nearby-airport warning.
    pub fn interpretation(&self, station: &Station) -> String {
        let mut text = self
            .air_grade()
            .map(|g| g.interpretation())
            .unwrap_or_default();
        if station.has_nearby_airport() {
            text.push_str(
                "Un ou plusieurs aéroports se situent à proximité de la station. \
                 Cela peut influer sur la mesure des polluants et donc sur la qualité de l'air induite. ",
            );
        }
        text
    }

    /// Forget the active station and its chart.
    pub fn clear(&mut self) {
        self.active_station = None;
        self.outcome = None;
        self.selected = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqfr_lcsqa::measurement::DailyMeasurement;
    use aqfr_lcsqa::source::MemorySource;

    fn row(pollutant: &str, mean: f64, note: u8) -> DailyMeasurement {
        DailyMeasurement {
            id: "FR001".to_string(),
            name: "Station".to_string(),
            pollutant: pollutant.to_string(),
            mean,
            median: mean,
            stdev: 0.0,
            min: mean - 1.0,
            max: mean + 10.0,
            unit: "µg-m3".to_string(),
            note,
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 2, d).unwrap()
    }

    fn source() -> MemorySource {
        let mut source = MemorySource::new();
        source.insert(date(13), vec![row("NO2", 30.0, 1), row("O3", 70.0, 2)]);
        source.insert(date(14), vec![row("NO2", 35.0, 1)]);
        source.insert(date(15), vec![row("NO2", 40.0, 2), row("O3", 120.0, 3)]);
        source
    }

    fn station(airports: Vec<String>) -> Station {
        Station {
            id: "FR001".to_string(),
            latitude: 48.0,
            longitude: 2.0,
            airports,
            city: "Paris".to_string(),
            county_code: "75".to_string(),
            county_name: "Paris".to_string(),
        }
    }

    #[test]
    fn test_show_station_builds_chart() {
        let mut state = ViewState::new(date(15));
        state.day_range = 2;
        assert!(state.show_station(&source(), "FR001").unwrap());
        assert_eq!(state.selected_pollutant(), Some("NO2"));
        assert_eq!(
            state.selected_series().unwrap().mean,
            vec![Some(30.0), Some(35.0), Some(40.0)]
        );
        assert_eq!(state.air_grade(), AirGrade::new(3));
        assert_eq!(state.pie_slices().len(), 2);
        assert_eq!(state.day_summary(), vec!["NO2 : 40 µg-m3", "O3 : 120 µg-m3"]);
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let src = source();
        let mut state = ViewState::new(date(15));
        state.day_range = 2;
        let first = state.begin_request();
        let second = state.begin_request();
        let newer = aggregate_station(&src, "FR001", date(15), 0);
        let older = aggregate_station(&src, "FR001", date(15), 2);
        assert!(state.apply(second, newer).unwrap());
        assert!(!state.apply(first, older).unwrap());
        assert_eq!(state.aggregate().unwrap().len_days(), 1);
    }

    #[test]
    fn test_missing_day_shows_no_data() {
        let mut src = source();
        src.remove(&date(14));
        let mut state = ViewState::new(date(15));
        state.day_range = 2;
        assert!(state.show_station(&src, "FR001").unwrap());
        assert_eq!(state.outcome(), Some(&Outcome::NoData));
        assert!(state.pie_slices().is_empty());
        assert!(state.air_grade().is_none());
        assert!(state.select_pollutant(0).is_err());
    }

    #[test]
    fn test_select_pollutant_and_level_info() {
        let mut state = ViewState::new(date(15));
        state.day_range = 2;
        state.show_station(&source(), "FR001").unwrap();
        assert_eq!(state.select_pollutant(1).unwrap(), "O3");
        assert!(state.select_pollutant(2).is_err());
        assert_eq!(
            state.chart_title().unwrap(),
            "Évolution de la concentration de O3 au cours du temps"
        );
        // O3 missing on the 14th: no level info for that day.
        assert!(state.level_info_at(1).is_none());
        let info = state.level_info_at(2).unwrap();
        assert_eq!(info.date, date(15));
        assert_eq!(info.bars[2].value, 140.0);
    }

    #[test]
    fn test_title_and_interpretation() {
        let mut state = ViewState::new(date(15));
        state.day_range = 2;
        state.show_station(&source(), "FR001").unwrap();
        let with_airport = station(vec!["Paris-Orly".to_string()]);
        assert_eq!(state.title(&with_airport), "Station FR001 (15-02-2022)");
        let text = state.interpretation(&with_airport);
        assert!(text.starts_with("La qualité de l'air est dégradée. Il est recommandé"));
        assert!(text.contains("aéroports"));
        assert!(!state.interpretation(&station(Vec::new())).contains("aéroports"));
    }

    #[test]
    fn test_clear_and_refresh_without_station() {
        let mut state = ViewState::new(date(15));
        // Default range reaches back to days the source does not hold.
        assert!(state.show_station(&source(), "FR001").unwrap());
        assert_eq!(state.outcome(), Some(&Outcome::NoData));
        state.clear();
        assert!(state.active_station.is_none());
        assert!(state.outcome().is_none());
        assert!(!state.refresh(&source()).unwrap());
    }
}
