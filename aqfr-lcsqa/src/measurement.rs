use crate::error::{AqError, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};

/// Column positions in the raw LCSQA E2 export (semicolon separated).
pub mod raw_columns {
    pub const CODE_SITE: usize = 5;
    pub const NOM_SITE: usize = 6;
    pub const POLLUANT: usize = 8;
    pub const VAL_BRUTE: usize = 16;
    pub const UNITE: usize = 17;
}

/// One processed row: a station's statistics for one pollutant on one day.
///
/// Serialized with the processed table headers
/// `id,name,pollutant,mean,median,stdev,min,max,unit,note`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMeasurement {
    pub id: String,
    pub name: String,
    pub pollutant: String,
    pub mean: f64,
    pub median: f64,
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
    pub unit: String,
    /// Grade 1 (good) to 6 (extremely bad); 0 when the pollutant is not graded
    pub note: u8,
}

/// All processed rows for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayTable {
    pub date: NaiveDate,
    pub rows: Vec<DailyMeasurement>,
}

impl DayTable {
    pub fn new(date: NaiveDate, rows: Vec<DailyMeasurement>) -> Self {
        DayTable { date, rows }
    }

    /// Parse a processed day table from CSV text.
    pub fn parse_csv(date: NaiveDate, csv_object: &str) -> Result<DayTable> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv_object.as_bytes());
        let rows = rdr
            .deserialize::<DailyMeasurement>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(DayTable { date, rows })
    }

    /// Serialize the rows back to processed CSV text.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &self.rows {
            writer.serialize(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AqError::Io(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| AqError::InvalidFormat(e.to_string()))
    }

    /// Rows reported by `station_id`, in table order.
    pub fn for_station<'a>(
        &'a self,
        station_id: &'a str,
    ) -> impl Iterator<Item = &'a DailyMeasurement> {
        self.rows.iter().filter(move |row| row.id == station_id)
    }
}

/// A single hourly value from the raw LCSQA E2 export.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub station_id: String,
    pub station_name: String,
    pub pollutant: String,
    /// `None` when the raw value is empty or not a number
    pub value: Option<f64>,
    pub unit: String,
}

impl RawReading {
    /// True when the value is present and not negative.
    pub fn is_valid(&self) -> bool {
        matches!(self.value, Some(v) if v >= 0.0)
    }

    /// Parse the raw semicolon separated export, skipping the header row.
    pub fn parse_e2(csv_object: &str) -> Result<Vec<RawReading>> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_object.as_bytes());
        let mut readings = Vec::new();
        for row in rdr.records() {
            let record = row?;
            if let Some(reading) = RawReading::from_record(&record) {
                readings.push(reading);
            }
        }
        Ok(readings)
    }

    fn from_record(record: &StringRecord) -> Option<RawReading> {
        let station_id = record.get(raw_columns::CODE_SITE)?.trim();
        if station_id.is_empty() {
            return None;
        }
        let value_str = record.get(raw_columns::VAL_BRUTE).unwrap_or("").trim();
        Some(RawReading {
            station_id: station_id.to_string(),
            station_name: record.get(raw_columns::NOM_SITE).unwrap_or("").trim().to_string(),
            pollutant: record.get(raw_columns::POLLUANT).unwrap_or("").trim().to_string(),
            value: value_str.parse::<f64>().ok(),
            unit: record.get(raw_columns::UNITE).unwrap_or("").trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROCESSED_CSV: &str = "\
id,name,pollutant,mean,median,stdev,min,max,unit,note
FR04002,Paris 13eme,NO2,30.5,29.0,4.2,21.0,41.0,µg-m3,2
FR04002,Paris 13eme,O3,55.0,54.0,10.1,30.0,80.0,µg-m3,2
FR03043,Marseille Longchamp,PM10,18.2,17.0,3.3,11.0,27.0,µg-m3,1
";

    const RAW_E2: &str = "\
Date de début;Date de fin;Organisme;code zas;Zas;code site;nom site;type d'implantation;Polluant;type d'influence;discriminant;Réglementaire;type d'évaluation;procédure de mesure;type de valeur;valeur;valeur brute;unité de mesure;taux de saisie;couverture temporelle;couverture de données;code qualité;validité
2022/02/15 00:00:00;2022/02/15 01:00:00;AIRPARIF;FR11ZAG01;ZAG PARIS;FR04002;Paris 13eme;Urbaine;NO2;Fond;A;Oui;mesures fixes;Auto;moyenne horaire brute;31;31.2;µg-m3;;;;A;1
2022/02/15 01:00:00;2022/02/15 02:00:00;AIRPARIF;FR11ZAG01;ZAG PARIS;FR04002;Paris 13eme;Urbaine;NO2;Fond;A;Oui;mesures fixes;Auto;moyenne horaire brute;;;µg-m3;;;;N;-1
2022/02/15 02:00:00;2022/02/15 03:00:00;AIRPARIF;FR11ZAG01;ZAG PARIS;FR04002;Paris 13eme;Urbaine;NO2;Fond;A;Oui;mesures fixes;Auto;moyenne horaire brute;-2;-2.0;µg-m3;;;;A;1
";

    #[test]
    fn test_parse_processed_day_table() {
        let date = NaiveDate::from_ymd_opt(2022, 2, 15).unwrap();
        let table = DayTable::parse_csv(date, PROCESSED_CSV).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].pollutant, "NO2");
        assert_eq!(table.rows[0].note, 2);
        assert_eq!(table.rows[2].unit, "µg-m3");
        assert_eq!(table.for_station("FR04002").count(), 2);
        assert_eq!(table.for_station("FR00000").count(), 0);
    }

    #[test]
    fn test_day_table_csv_round_trip_keeps_headers() {
        let date = NaiveDate::from_ymd_opt(2022, 2, 15).unwrap();
        let table = DayTable::parse_csv(date, PROCESSED_CSV).unwrap();
        let text = table.to_csv().unwrap();
        assert!(text.starts_with("id,name,pollutant,mean,median,stdev,min,max,unit,note"));
        assert_eq!(DayTable::parse_csv(date, &text).unwrap(), table);
    }

    #[test]
    fn test_parse_raw_e2() {
        let readings = RawReading::parse_e2(RAW_E2).unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].station_id, "FR04002");
        assert_eq!(readings[0].station_name, "Paris 13eme");
        assert_eq!(readings[0].pollutant, "NO2");
        assert_eq!(readings[0].value, Some(31.2));
        assert_eq!(readings[0].unit, "µg-m3");
        assert!(readings[0].is_valid());
        assert_eq!(readings[1].value, None);
        assert!(!readings[1].is_valid());
        assert!(!readings[2].is_valid());
    }
}
