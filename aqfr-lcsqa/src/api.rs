//! HTTP clients for the LCSQA real-time files and the geo.api.gouv.fr
//! commune/department lookups.

use crate::error::{AqError, Result};
use aqfr_utils::dates::raw_table_name;
use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Base URL of the real-time regulated pollutant concentration files.
pub const LCSQA_BASE_URL: &str =
    "https://files.data.gouv.fr/lcsqa/concentrations-de-polluants-atmospheriques-reglementes/temps-reel";

/// Base URL of the French administrative geography API.
pub const GEO_BASE_URL: &str = "https://geo.api.gouv.fr";

/// Downloads one raw E2 file per calendar day.
#[derive(Debug, Clone)]
pub struct LcsqaClient {
    client: Client,
    base_url: String,
}

impl LcsqaClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, LCSQA_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        LcsqaClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `<base>/<year>/FR_E2_<date>.csv`
    pub fn raw_day_url(&self, date: &NaiveDate) -> String {
        format!("{}/{}/{}", self.base_url, date.year(), raw_table_name(date))
    }

    /// Fetch the raw export for `date`.
    ///
    /// A non-success status or an empty body means the day is not published,
    /// reported as [`AqError::ResourceUnavailable`]. No retry is attempted.
    pub async fn fetch_raw_day(&self, date: NaiveDate) -> Result<String> {
        let url = self.raw_day_url(&date);
        let response = self.client.get(&url).send().await?;
        if response.status() != StatusCode::OK {
            warn!("lcsqa: bad response status for {}: {}", url, response.status());
            return Err(AqError::ResourceUnavailable {
                date,
                reason: format!("HTTP {}", response.status()),
            });
        }
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(AqError::ResourceUnavailable {
                date,
                reason: "empty response".to_string(),
            });
        }
        info!("lcsqa: fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Commune {
    pub nom: String,
    #[serde(rename = "codeDepartement")]
    pub code_departement: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Departement {
    pub nom: String,
    pub code: String,
}

/// Resolves coordinates to commune and department.
#[derive(Debug, Clone)]
pub struct GeoClient {
    client: Client,
    base_url: String,
}

impl GeoClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, GEO_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        GeoClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The commune containing (`latitude`, `longitude`).
    pub async fn locate(&self, latitude: f64, longitude: f64) -> Result<Commune> {
        let url = format!("{}/communes?lat={}&lon={}", self.base_url, latitude, longitude);
        let body = self.get_text(&url).await?;
        let communes: Vec<Commune> = serde_json::from_str(&body)?;
        communes.into_iter().next().ok_or_else(|| {
            AqError::InvalidFormat(format!("no commune at {latitude},{longitude}"))
        })
    }

    /// Department metadata for a department code such as "75" or "2A".
    pub async fn department(&self, code: &str) -> Result<Departement> {
        let url = format!("{}/departements/{}", self.base_url, code);
        let body = self.get_text(&url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}
