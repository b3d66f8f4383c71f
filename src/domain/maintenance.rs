// Service interval estimation from an odometer reading
use serde::Serialize;

use super::vehicle::VehicleTelemetry;

pub const BASE_SERVICE_INTERVAL_KM: f64 = 10_000.0;
pub const SERVICE_INTERVAL_SPREAD_KM: u32 = 10_000;
pub const CRITICAL_REMAINING_KM: f64 = 1_000.0;
pub const WARNING_REMAINING_KM: f64 = 3_000.0;

const MOCK_ODOMETER_MIN_KM: u32 = 10_000;
const MOCK_ODOMETER_RANGE_KM: u32 = 170_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Ok,
    Warning,
    Critical,
}

impl ServiceStatus {
    pub fn from_remaining(remaining_km: f64) -> Self {
        if remaining_km <= CRITICAL_REMAINING_KM {
            ServiceStatus::Critical
        } else if remaining_km <= WARNING_REMAINING_KM {
            ServiceStatus::Warning
        } else {
            ServiceStatus::Ok
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceStatus::Ok => "V pořádku",
            ServiceStatus::Warning => "Brzy servis",
            ServiceStatus::Critical => "Servis nutný",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OdometerSource {
    Reported,
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEstimate {
    pub odometer: f64,
    pub service_interval: f64,
    pub last_service_at: f64,
    pub next_service_at: f64,
    pub remaining_km: f64,
    pub status: ServiceStatus,
    pub status_label: &'static str,
    pub progress_percent: u8,
    pub source: OdometerSource,
}

impl ServiceEstimate {
    fn from_parts(odometer: f64, service_interval: f64, last_service_at: f64, source: OdometerSource) -> Self {
        let next_service_at = last_service_at + service_interval;
        let remaining_km = next_service_at - odometer;
        let status = ServiceStatus::from_remaining(remaining_km);

        Self {
            odometer,
            service_interval,
            last_service_at,
            next_service_at,
            remaining_km,
            status,
            status_label: status.label(),
            progress_percent: progress_percent(odometer, last_service_at, service_interval),
            source,
        }
    }
}

/// Share of the current interval already driven, 0-100.
pub fn progress_percent(odometer: f64, last_service_at: f64, service_interval: f64) -> u8 {
    if service_interval <= 0.0 {
        return 0;
    }
    let used = (odometer - last_service_at) / service_interval * 100.0;
    used.round().clamp(0.0, 100.0) as u8
}

/// Estimate from a real odometer; the interval is seeded by the odometer itself.
pub fn estimate_from_odometer(odometer: f64) -> ServiceEstimate {
    let service_interval = BASE_SERVICE_INTERVAL_KM + (odometer.floor().abs() % f64::from(SERVICE_INTERVAL_SPREAD_KM));
    let last_service_at = odometer - (odometer % service_interval);
    ServiceEstimate::from_parts(odometer, service_interval, last_service_at, OdometerSource::Reported)
}

/// Stable 32-bit string hash (31-multiplier, wrapping), made non-negative.
/// Each character contributes its leading UTF-16 unit.
fn stable_hash(input: &str) -> u32 {
    let mut units = [0u16; 2];
    input
        .chars()
        .map(|c| c.encode_utf16(&mut units)[0])
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
        .unsigned_abs()
}

/// Deterministic stand-in for vehicles that do not report an odometer.
pub fn estimate_for_vehicle_id(vehicle_id: &str) -> ServiceEstimate {
    let service_interval = BASE_SERVICE_INTERVAL_KM as u32 + stable_hash(vehicle_id) % SERVICE_INTERVAL_SPREAD_KM;
    let since_service = stable_hash(&format!("{vehicle_id}_progress")) % service_interval;
    let odometer = MOCK_ODOMETER_MIN_KM + stable_hash(&format!("{vehicle_id}_odo")) % (MOCK_ODOMETER_RANGE_KM + 1);

    ServiceEstimate::from_parts(
        f64::from(odometer),
        f64::from(service_interval),
        f64::from(odometer) - f64::from(since_service),
        OdometerSource::Simulated,
    )
}

pub fn estimate_service(vehicle: &VehicleTelemetry) -> ServiceEstimate {
    match vehicle.odometer {
        Some(odometer) => estimate_from_odometer(odometer),
        None => estimate_for_vehicle_id(&vehicle.id),
    }
}
