// Source traits for fleet and weather data
use crate::domain::fuel::SensorSeries;
use crate::domain::vehicle::{Position, VehicleTelemetry};
use crate::domain::weather::WeatherReading;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait FleetRepository: Send + Sync {
    /// Vehicle groups as returned by the provider
    async fn list_groups(&self) -> anyhow::Result<serde_json::Value>;

    /// Latest telemetry for every vehicle in a group
    async fn list_vehicles(&self, group: &str) -> anyhow::Result<Vec<VehicleTelemetry>>;

    /// Named sensor channels for one vehicle within [from, to]
    async fn sensor_series(
        &self,
        vehicle_id: &str,
        channels: &[&str],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> anyhow::Result<SensorSeries>;

    /// Number of eco-driving events within [from, to]
    async fn eco_event_count(
        &self,
        vehicle_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> anyhow::Result<u32>;
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Normalized current conditions at a position
    async fn current(&self, position: Position) -> anyhow::Result<WeatherReading>;
}
