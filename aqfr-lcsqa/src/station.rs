use crate::error::{AqError, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Separator between airport names in the `Airport` column.
pub const AIRPORT_SEPARATOR: char = '|';

/// Represents a French air-quality monitoring station.
///
/// Built once from one row of `stations_coords_processed.csv`:
/// `Station ID,Latitude,Longitude,Airport,City,County #,County Name`
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Station {
    /// LCSQA site code (e.g., "FR04002")
    pub id: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Names of the airports within the proximity radius
    pub airports: Vec<String>,
    /// Commune the station belongs to
    pub city: String,
    /// Department number (e.g., "75", "2A")
    pub county_code: String,
    /// Department name
    pub county_name: String,
}

impl Station {
    pub fn position(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    pub fn has_nearby_airport(&self) -> bool {
        !self.airports.is_empty()
    }
}

/// Split an `Airport` cell into names, dropping empty entries.
pub fn split_airports(cell: &str) -> Vec<String> {
    cell.split(AIRPORT_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// One entry of the county → city → station selector.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct SelectorNode {
    /// Text displayed for the node
    pub text: String,
    /// Station id; only set on leaf nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SelectorNode>,
}

impl SelectorNode {
    fn branch(text: &str, children: Vec<SelectorNode>) -> Self {
        SelectorNode {
            text: text.to_string(),
            id: None,
            children,
        }
    }

    fn leaf(station_id: &str) -> Self {
        SelectorNode {
            text: station_id.to_string(),
            id: Some(station_id.to_string()),
            children: Vec::new(),
        }
    }

    /// Keep this node whole when its text contains `term`, otherwise keep
    /// only the direct children whose text contains it.
    fn matching(&self, term: &str) -> Option<SelectorNode> {
        if self.text.to_lowercase().contains(term) {
            return Some(self.clone());
        }
        let children: Vec<SelectorNode> = self
            .children
            .iter()
            .filter(|child| child.text.to_lowercase().contains(term))
            .cloned()
            .collect();
        if children.is_empty() {
            None
        } else {
            Some(SelectorNode {
                children,
                ..self.clone()
            })
        }
    }
}

/// All stations known to the dashboard, indexed by id.
#[derive(Debug, Default, Clone)]
pub struct StationRegistry {
    stations: HashMap<String, Station>,
    order: Vec<String>,
}

impl StationRegistry {
    /// Parse the processed station coordinates CSV.
    pub fn parse_csv(csv_object: &str) -> Result<StationRegistry> {
        let mut registry = StationRegistry::default();
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_object.as_bytes());
        for (line, row) in rdr.records().enumerate() {
            let record = row?;
            let field = |idx: usize| record.get(idx).unwrap_or("").trim();
            let id = field(0);
            if id.is_empty() {
                log::warn!("stations: skipping row {} without station id", line + 2);
                continue;
            }
            let latitude = parse_coordinate(field(1), id)?;
            let longitude = parse_coordinate(field(2), id)?;
            registry.insert(Station {
                id: id.to_string(),
                latitude,
                longitude,
                airports: split_airports(field(3)),
                city: field(4).to_string(),
                county_code: field(5).to_string(),
                county_name: field(6).to_string(),
            });
        }
        log::info!("stations: loaded {} stations", registry.len());
        Ok(registry)
    }

    /// Add a station, replacing any previous station with the same id.
    pub fn insert(&mut self, station: Station) {
        if !self.stations.contains_key(&station.id) {
            self.order.push(station.id.clone());
        }
        self.stations.insert(station.id.clone(), station);
    }

    pub fn get(&self, id: &str) -> Option<&Station> {
        self.stations.get(id)
    }

    /// Like [`get`](Self::get) but reports unknown ids as an error.
    pub fn require(&self, id: &str) -> Result<&Station> {
        self.get(id)
            .ok_or_else(|| AqError::StationNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.stations.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Stations in input order.
    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.order.iter().filter_map(|id| self.stations.get(id))
    }

    /// Group station ids by county name then city, both sorted.
    pub fn by_county(&self) -> BTreeMap<String, BTreeMap<String, Vec<String>>> {
        let mut counties: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        for station in self.iter() {
            counties
                .entry(station.county_name.clone())
                .or_default()
                .entry(station.city.clone())
                .or_default()
                .push(station.id.clone());
        }
        counties
    }

    /// County → city → station tree for the station selector.
    pub fn selector_tree(&self) -> Vec<SelectorNode> {
        self.by_county()
            .iter()
            .map(|(county, cities)| {
                let city_nodes = cities
                    .iter()
                    .map(|(city, ids)| {
                        let leaves = ids.iter().map(|id| SelectorNode::leaf(id)).collect();
                        SelectorNode::branch(city, leaves)
                    })
                    .collect();
                SelectorNode::branch(county, city_nodes)
            })
            .collect()
    }

    /// Filter the selector tree with a case-insensitive search term.
    ///
    /// A blank term returns the full tree.
    pub fn search(&self, term: &str) -> Vec<SelectorNode> {
        let term = term.trim().to_lowercase();
        let tree = self.selector_tree();
        if term.is_empty() {
            return tree;
        }
        tree.iter().filter_map(|node| node.matching(&term)).collect()
    }
}

fn parse_coordinate(value: &str, station_id: &str) -> Result<f64> {
    value.parse::<f64>().map_err(|_| {
        AqError::InvalidFormat(format!(
            "station {station_id}: invalid coordinate '{value}'"
        ))
    })
}
