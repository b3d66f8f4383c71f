// GPS fleet provider repository implementation
use crate::application::fleet_repository::FleetRepository;
use crate::domain::fuel::SensorSeries;
use crate::domain::vehicle::VehicleTelemetry;
use crate::infrastructure::upstream_error::fetch_json;
use crate::infrastructure::upstream_mapper::{eco_event_count_from_json, sensor_series_from_json, vehicles_from_json};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

const PROVIDER: &str = "GPS API";

#[derive(Debug, Clone)]
pub struct GpsRepository {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

/// Minute-precision UTC timestamp used in provider query strings.
pub fn format_query_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M").to_string()
}

impl GpsRepository {
    pub fn new(client: reqwest::Client, base_url: String, username: String, password: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
        }
    }

    fn url(&self, segments: &[&str]) -> String {
        let path: Vec<String> = segments.iter().map(|s| urlencoding::encode(s).into_owned()).collect();
        format!("{}/{}", self.base_url, path.join("/"))
    }

    fn window_query(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
        format!(
            "from={}&to={}",
            urlencoding::encode(&format_query_time(from)),
            urlencoding::encode(&format_query_time(to))
        )
    }

    async fn get(&self, url: String) -> Result<Value> {
        tracing::debug!("GET {}", url);
        let request = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password));
        Ok(fetch_json(PROVIDER, request).await?)
    }
}

#[async_trait]
impl FleetRepository for GpsRepository {
    async fn list_groups(&self) -> Result<Value> {
        self.get(self.url(&["groups"])).await
    }

    async fn list_vehicles(&self, group: &str) -> Result<Vec<VehicleTelemetry>> {
        let raw = self.get(self.url(&["vehicles", "group", group])).await?;
        vehicles_from_json(raw).with_context(|| format!("Unexpected vehicle list for group {}", group))
    }

    async fn sensor_series(
        &self,
        vehicle_id: &str,
        channels: &[&str],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<SensorSeries> {
        let names: Vec<String> = channels.iter().map(|c| urlencoding::encode(c).into_owned()).collect();
        let url = format!(
            "{}/{}?{}",
            self.url(&["vehicle", vehicle_id, "sensors"]),
            names.join(","),
            Self::window_query(from, to)
        );
        let raw = self.get(url).await?;
        Ok(sensor_series_from_json(&raw))
    }

    async fn eco_event_count(&self, vehicle_id: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u32> {
        let url = format!(
            "{}?{}",
            self.url(&["vehicle", vehicle_id, "eco-driving-events"]),
            Self::window_query(from, to)
        );
        let raw = self.get(url).await?;
        Ok(eco_event_count_from_json(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn repo() -> GpsRepository {
        GpsRepository::new(
            reqwest::Client::new(),
            "https://gps.example.com/api/v1/".to_string(),
            "user".to_string(),
            "pass".to_string(),
        )
    }

    #[test]
    fn test_url_building() {
        assert_eq!(repo().url(&["groups"]), "https://gps.example.com/api/v1/groups");
        assert_eq!(
            repo().url(&["vehicles", "group", "North/East"]),
            "https://gps.example.com/api/v1/vehicles/group/North%2FEast"
        );
    }

    #[test]
    fn test_window_query_uses_minute_precision() {
        let to = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap();
        let from = to - chrono::Duration::minutes(90);

        assert_eq!(
            GpsRepository::window_query(from, to),
            "from=2024-05-01T11%3A00&to=2024-05-01T12%3A30"
        );
    }
}
