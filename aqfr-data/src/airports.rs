//! Airport proximity for stations.
//!
//! Airports near a station can bias its readings, so the station table
//! carries the names of every airport within [`MIN_DIST_KM`].

use aqfr_lcsqa::error::{AqError, Result};
use aqfr_lcsqa::station::AIRPORT_SEPARATOR;
use aqfr_utils::geo::{dms_to_decimal, haversine_km};
use csv::{ReaderBuilder, WriterBuilder};
use log::info;

/// Radius within which an airport counts as nearby.
pub const MIN_DIST_KM: f64 = 18.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Decimal degrees, or degrees/minutes/seconds when the cell is not a plain number.
fn parse_degrees(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    cell.parse::<f64>().ok().or_else(|| dms_to_decimal(cell))
}

/// Parse `Name,Latitude,Longitude` rows.
pub fn parse_airports_csv(csv_object: &str) -> Result<Vec<Airport>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_object.as_bytes());
    let mut airports = Vec::new();
    for row in rdr.records() {
        let record = row?;
        let name = record.get(0).unwrap_or("").trim();
        let coords = (
            record.get(1).and_then(parse_degrees),
            record.get(2).and_then(parse_degrees),
        );
        match coords {
            (Some(latitude), Some(longitude)) if !name.is_empty() => airports.push(Airport {
                name: name.to_string(),
                latitude,
                longitude,
            }),
            _ => {
                return Err(AqError::InvalidFormat(format!(
                    "airport row {:?} has no usable coordinates",
                    record
                )))
            }
        }
    }
    Ok(airports)
}

/// Names of the airports within `radius_km` of `position`, in input order.
pub fn nearby_airports(position: (f64, f64), airports: &[Airport], radius_km: f64) -> Vec<String> {
    airports
        .iter()
        .filter(|a| haversine_km((a.latitude, a.longitude), position) <= radius_km)
        .map(|a| a.name.clone())
        .collect()
}

/// Rewrite a `Station ID,Latitude,Longitude` table with an extra `Airport`
/// column holding the `|`-joined nearby airport names.
pub fn annotate_station_coords(coords_csv: &str, airports: &[Airport]) -> Result<String> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(coords_csv.as_bytes());
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(["Station ID", "Latitude", "Longitude", "Airport"])?;

    let mut count = 0usize;
    for row in rdr.records() {
        let record = row?;
        let id = record.get(0).unwrap_or("").trim();
        let lat = record.get(1).unwrap_or("").trim();
        let lon = record.get(2).unwrap_or("").trim();
        let position = match (lat.parse::<f64>(), lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => (lat, lon),
            _ => {
                return Err(AqError::InvalidFormat(format!(
                    "station {id}: invalid coordinates"
                )))
            }
        };
        let names = nearby_airports(position, airports, MIN_DIST_KM);
        let joined = names.join(&AIRPORT_SEPARATOR.to_string());
        writer.write_record([id, lat, lon, joined.as_str()])?;
        count += 1;
    }
    info!("airports: annotated {} stations", count);

    let bytes = writer
        .into_inner()
        .map_err(|e| AqError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| AqError::InvalidFormat(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const AIRPORTS_CSV: &str = "\
Name,Latitude,Longitude
Paris-Orly,48°43'24\",2°22'46\"
Paris-Charles de Gaulle,49.0097,2.5479
Marseille-Provence,43.4393,5.2214
";

    #[test]
    fn test_parse_airports_mixed_formats() {
        let airports = parse_airports_csv(AIRPORTS_CSV).unwrap();
        assert_eq!(airports.len(), 3);
        assert!((airports[0].latitude - 48.7233).abs() < 1e-3);
        assert!((airports[0].longitude - 2.3794).abs() < 1e-3);
        assert_eq!(airports[1].name, "Paris-Charles de Gaulle");
    }

    #[test]
    fn test_parse_airports_rejects_bad_row() {
        let err = parse_airports_csv("Name,Latitude,Longitude\nNowhere,north,east\n").unwrap_err();
        assert!(matches!(err, AqError::InvalidFormat(_)));
    }

    #[test]
    fn test_nearby_airports() {
        let airports = parse_airports_csv(AIRPORTS_CSV).unwrap();
        // Paris 13e is ~12 km from Orly and ~23 km from CDG.
        let near = nearby_airports((48.8283, 2.3597), &airports, MIN_DIST_KM);
        assert_eq!(near, vec!["Paris-Orly"]);
        let far = nearby_airports((45.7640, 4.8357), &airports, MIN_DIST_KM);
        assert!(far.is_empty());
    }

    #[test]
    fn test_annotate_station_coords() {
        let airports = parse_airports_csv(AIRPORTS_CSV).unwrap();
        let coords =
            "Station ID,Latitude,Longitude\nFR04002,48.8283,2.3597\nFR20004,45.7640,4.8357\n";
        let out = annotate_station_coords(coords, &airports).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Station ID,Latitude,Longitude,Airport");
        assert_eq!(lines[1], "FR04002,48.8283,2.3597,Paris-Orly");
        assert_eq!(lines[2], "FR20004,45.7640,4.8357,");
    }
}
