// Vehicle telemetry domain model
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Cache/query key, e.g. "50.08_14.42"
    pub fn key(&self) -> String {
        format!("{}_{}", self.lat, self.lng)
    }
}

/// One poll of a vehicle as reported by the fleet provider.
///
/// `speed` is expected to be non-negative; the scoring functions do not
/// re-validate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleTelemetry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub plate: String,
    pub speed: f64,
    pub last_position_time: String,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub odometer: Option<f64>,
}

impl VehicleTelemetry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, speed: f64, last_position_time: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            plate: String::new(),
            speed,
            last_position_time: last_position_time.into(),
            position: None,
            odometer: None,
        }
    }

    pub fn with_plate(mut self, plate: impl Into<String>) -> Self {
        self.plate = plate.into();
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_odometer(mut self, odometer: f64) -> Self {
        self.odometer = Some(odometer);
        self
    }

    pub fn last_position_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.last_position_time)
    }
}

/// Parse an upstream timestamp. RFC 3339 first; strings without an offset
/// are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
