// Fuel anomaly detection over a short sensor window
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const FUEL_CHANNEL: &str = "FuelActualVolume";
pub const SPEED_CHANNEL: &str = "Speed";

/// Recent history the detector expects the caller to fetch.
pub const FUEL_WINDOW_MINUTES: i64 = 90;
pub const STATIONARY_SPEED_KMH: f64 = 3.0;
pub const HIGH_DROP_LITERS: f64 = 5.0;
pub const LOW_DROP_LITERS: f64 = 3.0;
pub const HIGH_DROP_MAX_MINUTES: f64 = 10.0;
pub const SIMULATED_DURATION_MINUTES: f64 = 5.0;

pub const HIGH_SEVERITY_REASON: &str = "Úbytek paliva během stání";
pub const LOW_SEVERITY_REASON: &str = "Menší úbytek paliva během stání";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub time: DateTime<Utc>,
    pub value: f64,
}

impl SensorSample {
    pub fn new(time: DateTime<Utc>, value: f64) -> Self {
        Self { time, value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorChannel {
    pub name: String,
    samples: Vec<SensorSample>,
}

impl SensorChannel {
    /// Samples are kept ascending by time regardless of input order.
    pub fn new(name: impl Into<String>, mut samples: Vec<SensorSample>) -> Self {
        samples.sort_by_key(|s| s.time);
        Self {
            name: name.into(),
            samples,
        }
    }

    pub fn samples(&self) -> &[SensorSample] {
        &self.samples
    }
}

/// Named sensor channels for one vehicle over a bounded window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorSeries {
    channels: Vec<SensorChannel>,
}

impl SensorSeries {
    pub fn new(channels: Vec<SensorChannel>) -> Self {
        Self { channels }
    }

    /// Case-insensitive channel lookup; empty when the channel is absent.
    pub fn samples(&self, name: &str) -> &[SensorSample] {
        self.channels
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.samples())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelStatus {
    Normal,
    InsufficientData,
    Anomaly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelSeverity {
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelAnomalyVerdict {
    pub status: FuelStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<FuelSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_drop: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    pub risk_impact: u8,
}

impl FuelAnomalyVerdict {
    pub fn normal() -> Self {
        Self::plain(FuelStatus::Normal)
    }

    pub fn insufficient_data() -> Self {
        Self::plain(FuelStatus::InsufficientData)
    }

    fn plain(status: FuelStatus) -> Self {
        Self {
            status,
            severity: None,
            reason: None,
            fuel_drop: None,
            duration_minutes: None,
            risk_impact: 0,
        }
    }

    fn anomaly(severity: FuelSeverity, fuel_drop: f64, duration_minutes: f64) -> Self {
        let (reason, risk_impact) = match severity {
            FuelSeverity::High => (HIGH_SEVERITY_REASON, 3),
            FuelSeverity::Low => (LOW_SEVERITY_REASON, 1),
        };
        Self {
            status: FuelStatus::Anomaly,
            severity: Some(severity),
            reason: Some(reason.to_string()),
            fuel_drop: Some(fuel_drop),
            duration_minutes: Some(duration_minutes),
            risk_impact,
        }
    }

    pub fn is_anomaly(&self) -> bool {
        self.status == FuelStatus::Anomaly
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn classify(fuel_drop: f64, duration_minutes: f64, is_stationary: bool) -> FuelAnomalyVerdict {
    if is_stationary && fuel_drop > HIGH_DROP_LITERS && duration_minutes <= HIGH_DROP_MAX_MINUTES {
        FuelAnomalyVerdict::anomaly(FuelSeverity::High, fuel_drop, duration_minutes)
    } else if is_stationary && (LOW_DROP_LITERS..=HIGH_DROP_LITERS).contains(&fuel_drop) {
        FuelAnomalyVerdict::anomaly(FuelSeverity::Low, fuel_drop, duration_minutes)
    } else {
        FuelAnomalyVerdict::normal()
    }
}

/// Speed sample nearest in time to `at`; earliest wins ties.
fn nearest_speed(speeds: &[SensorSample], at: DateTime<Utc>) -> Option<f64> {
    speeds
        .iter()
        .min_by_key(|s| (s.time - at).num_milliseconds().unsigned_abs())
        .map(|s| s.value)
}

/// Classify the last two fuel readings as normal consumption, a leak/theft
/// candidate, or too little data to tell.
pub fn detect_fuel_anomaly(vehicle_id: &str, series: &SensorSeries) -> FuelAnomalyVerdict {
    let fuel = series.samples(FUEL_CHANNEL);

    let [.., prev, curr] = fuel else {
        tracing::debug!("Vehicle {}: {} fuel samples, need 2", vehicle_id, fuel.len());
        return FuelAnomalyVerdict::insufficient_data();
    };

    let fuel_drop = round_to(prev.value - curr.value, 2);
    if fuel_drop <= 0.0 {
        return FuelAnomalyVerdict::normal();
    }

    let elapsed_ms = (curr.time - prev.time).num_milliseconds() as f64;
    let duration_minutes = round_to(elapsed_ms / 60_000.0, 1);
    if duration_minutes <= 0.0 {
        return FuelAnomalyVerdict::insufficient_data();
    }

    let is_stationary = nearest_speed(series.samples(SPEED_CHANNEL), curr.time)
        .is_some_and(|speed| speed < STATIONARY_SPEED_KMH);

    let verdict = classify(fuel_drop, duration_minutes, is_stationary);
    tracing::debug!(
        "Vehicle {}: fuel drop {} l over {} min, stationary={}, status={:?}",
        vehicle_id,
        fuel_drop,
        duration_minutes,
        is_stationary,
        verdict.status
    );
    verdict
}

/// Development-only entry point: classify a synthetic drop as if the vehicle
/// stood still for five minutes. Never used on real sensor data.
pub fn simulate_fuel_anomaly(fuel_drop: f64) -> FuelAnomalyVerdict {
    classify(fuel_drop, SIMULATED_DURATION_MINUTES, true)
}
