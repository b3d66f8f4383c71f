// Assessment service - Use case for scoring vehicles and whole groups
use crate::application::clock::Clock;
use crate::application::fleet_repository::{FleetRepository, WeatherSource};
use crate::domain::fleet::{FleetReport, VehicleInputs, VehicleView, WeatherView, build_vehicle_view};
use crate::domain::fuel::{FUEL_CHANNEL, FuelAnomalyVerdict, SPEED_CHANNEL, SensorSeries, detect_fuel_anomaly};
use crate::domain::vehicle::{Position, VehicleTelemetry};
use crate::domain::weather::{WeatherReading, evaluate_weather};
use crate::infrastructure::config::AssessmentSettings;
use chrono::{DateTime, Duration, Utc};
use futures::StreamExt;
use std::sync::Arc;

#[derive(Clone)]
pub struct AssessmentService {
    repository: Arc<dyn FleetRepository>,
    weather: Arc<dyn WeatherSource>,
    clock: Arc<dyn Clock>,
    settings: AssessmentSettings,
}

impl AssessmentService {
    pub fn new(
        repository: Arc<dyn FleetRepository>,
        weather: Arc<dyn WeatherSource>,
        clock: Arc<dyn Clock>,
        settings: AssessmentSettings,
    ) -> Self {
        Self {
            repository,
            weather,
            clock,
            settings,
        }
    }

    pub async fn list_groups(&self) -> anyhow::Result<serde_json::Value> {
        self.repository.list_groups().await
    }

    pub async fn list_vehicles(&self, group: &str) -> anyhow::Result<Vec<VehicleTelemetry>> {
        self.repository.list_vehicles(group).await
    }

    /// Assess every vehicle of a group, at most `concurrency` at a time, keeping input order.
    pub async fn assess_group(&self, group: &str) -> anyhow::Result<FleetReport> {
        let vehicles = self.list_vehicles(group).await?;
        tracing::info!("Assessing {} vehicles in group {}", vehicles.len(), group);

        let views: Vec<VehicleView> = futures::stream::iter(vehicles.into_iter().map(|vehicle| {
            let service = self.clone();
            async move { service.assess_vehicle(&vehicle).await }
        }))
        .buffered(self.settings.concurrency.max(1))
        .collect()
        .await;

        Ok(FleetReport::new(group.to_string(), self.clock.now(), views))
    }

    /// Fetch weather, sensors and eco events concurrently, then score.
    /// A failed fetch only removes that input.
    pub async fn assess_vehicle(&self, vehicle: &VehicleTelemetry) -> VehicleView {
        let now = self.clock.now();

        let (weather, sensors, eco_events) = tokio::join!(
            self.fetch_weather(vehicle),
            self.fetch_sensors(&vehicle.id, now),
            self.fetch_eco_events(&vehicle.id, now),
        );

        let inputs = VehicleInputs {
            weather: degrade("weather", &vehicle.id, weather).flatten(),
            sensors: degrade("sensors", &vehicle.id, sensors),
            eco_events: degrade("eco events", &vehicle.id, eco_events),
        };

        build_vehicle_view(vehicle, inputs, now)
    }

    pub async fn fuel_anomaly(&self, vehicle_id: &str) -> anyhow::Result<FuelAnomalyVerdict> {
        let series = self.fetch_sensors(vehicle_id, self.clock.now()).await?;
        Ok(detect_fuel_anomaly(vehicle_id, &series))
    }

    pub async fn weather_at(&self, position: Position) -> anyhow::Result<WeatherView> {
        let reading = self.weather.current(position).await?;
        let risk = evaluate_weather(&reading);
        Ok(WeatherView { reading, risk })
    }

    async fn fetch_weather(&self, vehicle: &VehicleTelemetry) -> anyhow::Result<Option<WeatherReading>> {
        match vehicle.position {
            Some(position) => Ok(Some(self.weather.current(position).await?)),
            None => Ok(None),
        }
    }

    async fn fetch_sensors(&self, vehicle_id: &str, now: DateTime<Utc>) -> anyhow::Result<SensorSeries> {
        let from = now - Duration::minutes(self.settings.fuel_window_minutes);
        self.repository
            .sensor_series(vehicle_id, &[FUEL_CHANNEL, SPEED_CHANNEL], from, now)
            .await
    }

    async fn fetch_eco_events(&self, vehicle_id: &str, now: DateTime<Utc>) -> anyhow::Result<u32> {
        let from = now - Duration::hours(self.settings.eco_window_hours);
        self.repository.eco_event_count(vehicle_id, from, now).await
    }
}

fn degrade<T>(input: &str, vehicle_id: &str, result: anyhow::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Vehicle {}: {} unavailable: {:#}", vehicle_id, input, e);
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::clock::ManualClock;
    use crate::domain::action::ActionLevel;
    use crate::domain::fuel::{FuelStatus, SensorChannel, SensorSample};
    use crate::domain::risk::{RiskLevel, RiskReason};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use parking_lot::Mutex;

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    /// In-memory provider; vehicles listed in `failing` error on every side fetch.
    #[derive(Default)]
    pub struct FakeFleet {
        pub vehicles: Vec<VehicleTelemetry>,
        pub sensors: Vec<(String, SensorSeries)>,
        pub eco_events: u32,
        pub failing: Vec<String>,
        pub sensor_windows: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    }

    #[async_trait]
    impl FleetRepository for FakeFleet {
        async fn list_groups(&self) -> anyhow::Result<serde_json::Value> {
            Ok(serde_json::json!([{"Code": "G1", "Name": "Main"}]))
        }

        async fn list_vehicles(&self, group: &str) -> anyhow::Result<Vec<VehicleTelemetry>> {
            if group != "G1" {
                anyhow::bail!("unknown group {}", group);
            }
            Ok(self.vehicles.clone())
        }

        async fn sensor_series(
            &self,
            vehicle_id: &str,
            _channels: &[&str],
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> anyhow::Result<SensorSeries> {
            if self.failing.iter().any(|id| id == vehicle_id) {
                anyhow::bail!("sensor API down");
            }
            self.sensor_windows.lock().push((from, to));
            Ok(self
                .sensors
                .iter()
                .find(|(id, _)| id == vehicle_id)
                .map(|(_, s)| s.clone())
                .unwrap_or_default())
        }

        async fn eco_event_count(&self, vehicle_id: &str, _from: DateTime<Utc>, _to: DateTime<Utc>) -> anyhow::Result<u32> {
            if self.failing.iter().any(|id| id == vehicle_id) {
                anyhow::bail!("eco API down");
            }
            Ok(self.eco_events)
        }
    }

    pub struct FixedWeather(pub WeatherReading);

    #[async_trait]
    impl WeatherSource for FixedWeather {
        async fn current(&self, _position: Position) -> anyhow::Result<WeatherReading> {
            Ok(self.0.clone())
        }
    }

    pub fn settings() -> AssessmentSettings {
        AssessmentSettings {
            concurrency: 2,
            fuel_window_minutes: 90,
            eco_window_hours: 24,
            dev_routes: false,
        }
    }

    pub fn service(fleet: FakeFleet, weather: WeatherReading) -> (AssessmentService, Arc<FakeFleet>) {
        let fleet = Arc::new(fleet);
        let service = AssessmentService::new(
            fleet.clone(),
            Arc::new(FixedWeather(weather)),
            Arc::new(ManualClock::new(now())),
            settings(),
        );
        (service, fleet)
    }

    pub fn vehicle(id: &str, speed: f64, minutes_ago: i64) -> VehicleTelemetry {
        VehicleTelemetry::new(id, format!("Vehicle {id}"), speed, (now() - Duration::minutes(minutes_ago)).to_rfc3339())
            .with_position(Position::new(50.08, 14.42))
    }

    fn stormy() -> WeatherReading {
        WeatherReading {
            temperature: 18.0,
            wind_speed: 4.0,
            weather_main: "Thunderstorm".to_string(),
            weather_id: 211,
            precipitation: 0.0,
        }
    }

    #[tokio::test]
    async fn test_assess_group_keeps_order_and_counts() {
        let fleet = FakeFleet {
            vehicles: vec![vehicle("A", 50.0, 0), vehicle("B", 140.0, 200), vehicle("C", 100.0, 30)],
            ..Default::default()
        };
        let (service, _) = service(fleet, WeatherReading::default());

        let report = service.assess_group("G1").await.unwrap();
        let ids: Vec<&str> = report.vehicles.iter().map(|v| v.assessment.vehicle_id.as_str()).collect();

        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.critical, 1);
        assert_eq!(report.summary.warning, 1);
        assert_eq!(report.summary.ok, 1);
        assert_eq!(report.generated_at, now());
    }

    #[tokio::test]
    async fn test_assess_group_runs_on_spawned_task() {
        let fleet = FakeFleet {
            vehicles: vec![vehicle("A", 50.0, 0), vehicle("B", 120.0, 0)],
            ..Default::default()
        };
        let (service, _) = service(fleet, WeatherReading::default());

        let report = tokio::spawn(async move { service.assess_group("G1").await })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.warning, 1);
    }

    #[tokio::test]
    async fn test_unknown_group_is_an_error() {
        let (service, _) = service(FakeFleet::default(), WeatherReading::default());
        assert!(service.assess_group("nope").await.is_err());
    }

    #[tokio::test]
    async fn test_weather_and_eco_feed_the_score() {
        let fleet = FakeFleet {
            eco_events: 1,
            ..Default::default()
        };
        let (service, _) = service(fleet, stormy());

        let view = service.assess_vehicle(&vehicle("A", 100.0, 0)).await;

        // 2 speed + 2 storm + 1 eco
        assert_eq!(view.assessment.risk_score, 5);
        assert_eq!(view.assessment.risk_level, RiskLevel::Warning);
        assert!(view.assessment.has_reason(|r| matches!(r, RiskReason::Weather { bump: 2, .. })));
        assert_eq!(view.action.level, ActionLevel::Soon);
        assert_eq!(view.fuel.map(|f| f.status), Some(FuelStatus::InsufficientData));
    }

    #[tokio::test]
    async fn test_failed_side_fetches_degrade_to_core_score() {
        let fleet = FakeFleet {
            eco_events: 5,
            failing: vec!["A".to_string()],
            ..Default::default()
        };
        let (service, _) = service(fleet, WeatherReading::default());

        let view = service.assess_vehicle(&vehicle("A", 120.0, 0)).await;

        assert_eq!(view.assessment.risk_score, 3);
        assert!(view.fuel.is_none());
        assert!(view.weather.is_some());
    }

    #[tokio::test]
    async fn test_fuel_anomaly_uses_ninety_minute_window() {
        let at = |m: i64| now() - Duration::minutes(m);
        let series = SensorSeries::new(vec![
            SensorChannel::new(FUEL_CHANNEL, vec![SensorSample::new(at(9), 50.0), SensorSample::new(at(4), 44.0)]),
            SensorChannel::new(SPEED_CHANNEL, vec![SensorSample::new(at(4), 0.0)]),
        ]);
        let fleet = FakeFleet {
            sensors: vec![("A".to_string(), series)],
            ..Default::default()
        };
        let (service, fleet) = service(fleet, WeatherReading::default());

        let verdict = service.fuel_anomaly("A").await.unwrap();

        assert_eq!(verdict.status, FuelStatus::Anomaly);
        assert_eq!(verdict.risk_impact, 3);
        assert_eq!(fleet.sensor_windows.lock().as_slice(), &[(now() - Duration::minutes(90), now())]);
    }

    #[tokio::test]
    async fn test_weather_at_position() {
        let (service, _) = service(FakeFleet::default(), stormy());
        let view = service.weather_at(Position::new(1.0, 2.0)).await.unwrap();
        assert_eq!(view.risk.weather_risk_bump, 2);
        assert_eq!(view.reading.weather_main, "Thunderstorm");
    }
}
