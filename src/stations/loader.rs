use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::stations::{RawStop, RouteId, StationRegistry};

/// Station list for the deployed campus loop, `route,name,lat,lng` per line.
const DEFAULT_STATIONS_CSV: &str = include_str!("../../data/stations.csv");

#[derive(Debug, Error)]
pub enum StationError {
    #[error("failed to read station file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed station csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },
}

/// Load the registry from `path`, or from the built-in station list when no
/// path is given.
pub fn load_stations(path: Option<&Path>) -> Result<StationRegistry, StationError> {
    let (route_a, route_b) = match path {
        Some(path) => {
            info!(path = %path.display(), "Loading stations from file");
            parse_stops(File::open(path)?)?
        }
        None => parse_stops(DEFAULT_STATIONS_CSV.as_bytes())?,
    };

    let registry = StationRegistry::build(&route_a, &route_b);
    info!(
        route_a = route_a.len(),
        route_b = route_b.len(),
        stations = registry.len(),
        "Loaded stations"
    );
    Ok(registry)
}

/// Split a station CSV into the per-route stop lists, preserving file order.
pub fn parse_stops<R: Read>(reader: R) -> Result<(Vec<RawStop>, Vec<RawStop>), StationError> {
    let mut route_a = Vec::new();
    let mut route_b = Vec::new();
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let invalid = |reason: String| StationError::InvalidRecord { line, reason };

        let route: RouteId = record.get(0).unwrap_or("").parse().map_err(invalid)?;
        let name = record.get(1).unwrap_or("").to_string();
        if name.is_empty() {
            return Err(invalid("station name is empty".to_string()));
        }
        let lat = parse_coordinate(record.get(2), "lat").map_err(invalid)?;
        let lng = parse_coordinate(record.get(3), "lng").map_err(invalid)?;

        let stop = RawStop { name, lat, lng };
        match route {
            RouteId::A => route_a.push(stop),
            RouteId::B => route_b.push(stop),
        }
    }

    Ok((route_a, route_b))
}

fn parse_coordinate(field: Option<&str>, column: &str) -> Result<f64, String> {
    let raw = field.unwrap_or("");
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{column} '{raw}' is not a number"))
}
