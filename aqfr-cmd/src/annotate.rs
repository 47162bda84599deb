//! Station CSV enrichment: nearby airports and commune / department names.

use aqfr_data::airports::{annotate_station_coords, parse_airports_csv};
use aqfr_lcsqa::api::GeoClient;
use csv::{ReaderBuilder, WriterBuilder};
use log::{info, warn};
use std::path::Path;

/// Commune and department resolved for one station row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Locality {
    pub city: String,
    pub county_code: String,
    pub county_name: String,
}

pub fn run_airports(airports_csv: &Path, coords_csv: &Path, output: &Path) -> anyhow::Result<()> {
    let airports = parse_airports_csv(&std::fs::read_to_string(airports_csv)?)?;
    let annotated = annotate_station_coords(&std::fs::read_to_string(coords_csv)?, &airports)?;
    std::fs::write(output, annotated)?;
    info!("Wrote {}", output.display());
    Ok(())
}

/// Append `City,County #,County Name` to each row of `coords_csv`.
///
/// `localities` is consumed in row order; missing entries leave the columns
/// empty.
pub fn write_enriched(coords_csv: &str, localities: &[Locality]) -> anyhow::Result<String> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(coords_csv.as_bytes());
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
    writer.write_record([
        "Station ID",
        "Latitude",
        "Longitude",
        "Airport",
        "City",
        "County #",
        "County Name",
    ])?;
    let empty = Locality::default();
    for (idx, row) in rdr.records().enumerate() {
        let record = row?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();
        let locality = localities.get(idx).unwrap_or(&empty);
        writer.write_record([
            field(0),
            field(1),
            field(2),
            field(3),
            locality.city.as_str(),
            locality.county_code.as_str(),
            locality.county_name.as_str(),
        ])?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

async fn locate(geo: &GeoClient, latitude: f64, longitude: f64) -> aqfr_lcsqa::Result<Locality> {
    let commune = geo.locate(latitude, longitude).await?;
    let departement = geo.department(&commune.code_departement).await?;
    Ok(Locality {
        city: commune.nom,
        county_code: departement.code,
        county_name: departement.nom,
    })
}

pub async fn run_enrich(coords_csv: &Path, output: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(coords_csv)?;
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;
    let geo = GeoClient::new(client);

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut localities = Vec::new();
    for row in rdr.records() {
        let record = row?;
        let id = record.get(0).unwrap_or("").trim().to_string();
        let coords = (
            record.get(1).and_then(|s| s.trim().parse::<f64>().ok()),
            record.get(2).and_then(|s| s.trim().parse::<f64>().ok()),
        );
        let locality = match coords {
            (Some(lat), Some(lon)) => match locate(&geo, lat, lon).await {
                Ok(locality) => locality,
                Err(e) => {
                    warn!("Failed to locate {}: {}", id, e);
                    Locality::default()
                }
            },
            _ => {
                warn!("Invalid coordinates for {}", id);
                Locality::default()
            }
        };
        localities.push(locality);
    }

    std::fs::write(output, write_enriched(&content, &localities)?)?;
    info!("Enriched {} stations into {}", localities.len(), output.display());
    Ok(())
}
