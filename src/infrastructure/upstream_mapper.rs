// Mappers from provider JSON shapes to domain types
use crate::domain::fuel::{SensorChannel, SensorSample, SensorSeries};
use crate::domain::vehicle::{Position, VehicleTelemetry, parse_timestamp};
use crate::domain::weather::WeatherReading;
use serde::Deserialize;
use serde_json::Value;

/// Every field but `Code` may be missing or `null` for vehicles that never reported.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpstreamVehicle {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "SPZ")]
    pub spz: Option<String>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub odometer: Option<f64>,
    #[serde(default)]
    pub last_position: Option<UpstreamPosition>,
    #[serde(default)]
    pub last_position_timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpstreamPosition {
    pub latitude: Value,
    pub longitude: Value,
}

/// Coordinates arrive as strings, occasionally as numbers.
fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl From<UpstreamVehicle> for VehicleTelemetry {
    fn from(v: UpstreamVehicle) -> Self {
        let position = v
            .last_position
            .as_ref()
            .and_then(|p| Some(Position::new(coordinate(&p.latitude)?, coordinate(&p.longitude)?)));

        let mut vehicle = VehicleTelemetry::new(
            v.code,
            v.name.unwrap_or_default(),
            v.speed.unwrap_or_default(),
            v.last_position_timestamp.unwrap_or_default(),
        )
        .with_plate(v.spz.unwrap_or_default());
        if let Some(position) = position {
            vehicle = vehicle.with_position(position);
        }
        if let Some(odometer) = v.odometer {
            vehicle = vehicle.with_odometer(odometer);
        }
        vehicle
    }
}

/// Map a vehicle list record by record; malformed records are skipped.
pub fn vehicles_from_json(raw: Value) -> anyhow::Result<Vec<VehicleTelemetry>> {
    let Value::Array(items) = raw else {
        anyhow::bail!("Vehicle list is not an array");
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<UpstreamVehicle>(item) {
            Ok(vehicle) => Some(VehicleTelemetry::from(vehicle)),
            Err(e) => {
                tracing::warn!("Skipping malformed vehicle record: {}", e);
                None
            }
        })
        .collect())
}

fn field<'a>(object: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

fn sample_from_json(point: &Value) -> Option<SensorSample> {
    let time = parse_timestamp(point.get("t")?.as_str()?)?;
    let value = point.get("v")?.as_f64()?;
    Some(SensorSample::new(time, value))
}

/// `[{Name|name, data|Data: [{t, v}]}]` into a canonical series. Invalid
/// samples are dropped; anything that is not an array yields an empty series.
pub fn sensor_series_from_json(raw: &Value) -> SensorSeries {
    let Some(items) = raw.as_array() else {
        tracing::debug!("Sensor payload is not an array, treating as empty");
        return SensorSeries::default();
    };

    let channels = items
        .iter()
        .filter_map(|item| {
            let name = field(item, &["Name", "name"])?.as_str()?;
            let samples = field(item, &["data", "Data"])
                .and_then(Value::as_array)
                .map(|points| points.iter().filter_map(sample_from_json).collect())
                .unwrap_or_default();
            Some(SensorChannel::new(name, samples))
        })
        .collect();

    SensorSeries::new(channels)
}

/// Normalize an OpenWeather current-conditions response.
pub fn weather_from_json(raw: &Value) -> WeatherReading {
    let defaults = WeatherReading::default();
    let condition = raw.pointer("/weather/0");

    WeatherReading {
        temperature: raw.pointer("/main/temp").and_then(Value::as_f64).unwrap_or(defaults.temperature),
        wind_speed: raw.pointer("/wind/speed").and_then(Value::as_f64).unwrap_or(defaults.wind_speed),
        weather_main: condition
            .and_then(|c| c.get("main"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(defaults.weather_main),
        weather_id: condition
            .and_then(|c| c.get("id"))
            .and_then(Value::as_u64)
            .and_then(|id| u32::try_from(id).ok())
            .unwrap_or(defaults.weather_id),
        precipitation: raw
            .pointer("/rain/1h")
            .or_else(|| raw.pointer("/snow/1h"))
            .and_then(Value::as_f64)
            .unwrap_or(defaults.precipitation),
    }
}

pub fn eco_event_count_from_json(raw: &Value) -> u32 {
    raw.as_array()
        .map(|events| u32::try_from(events.len()).unwrap_or(u32::MAX))
        .unwrap_or(0)
}
