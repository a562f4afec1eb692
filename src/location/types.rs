use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A bare geographic point, used for map centers and waypoint positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A reported position together with the instant it was observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub observed_at: DateTime<Utc>,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64, observed_at: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            observed_at,
        }
    }

    pub fn now(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, Utc::now())
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Same point, ignoring when it was observed.
    pub fn same_point(&self, other: &Coordinate) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

/// Body returned by the location endpoint on `GET`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredLocation {
    pub lat: f64,
    pub lng: f64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl From<Coordinate> for StoredLocation {
    fn from(c: Coordinate) -> Self {
        Self {
            lat: c.latitude,
            lng: c.longitude,
            timestamp: c.observed_at.timestamp_millis(),
        }
    }
}

/// A location report as a poller receives it. Every field is optional and
/// untyped: the backend may hand out nulls, strings or nothing at all, and
/// the client has to survive all of them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LocationReport {
    #[serde(default)]
    pub lat: Option<Value>,
    #[serde(default)]
    pub lng: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

impl LocationReport {
    pub fn from_numbers(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(Value::from(lat)),
            lng: Some(Value::from(lng)),
            timestamp: None,
        }
    }
}

impl From<StoredLocation> for LocationReport {
    fn from(s: StoredLocation) -> Self {
        Self {
            lat: Some(Value::from(s.lat)),
            lng: Some(Value::from(s.lng)),
            timestamp: Some(Value::from(s.timestamp)),
        }
    }
}

/// Coerce a loosely typed JSON value into a number.
///
/// Numbers pass through, strings are parsed after trimming. `null`, empty
/// strings, booleans, arrays and objects carry no usable fix and yield `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()
        }
        _ => None,
    }
}
