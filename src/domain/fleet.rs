// Per-vehicle view assembly and fleet counts
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::action::{ActionIntelligence, resolve_action};
use super::fuel::{FuelAnomalyVerdict, SensorSeries, detect_fuel_anomaly};
use super::maintenance::{ServiceEstimate, estimate_service};
use super::risk::{RiskAssessment, RiskLevel, RiskReason, assess_vehicle};
use super::trend::{RiskTrend, compute_risk_trend};
use super::vehicle::VehicleTelemetry;
use super::weather::{WeatherReading, WeatherRisk, evaluate_weather};

/// Eco-driving events needed before the larger contribution applies.
pub const ECO_EVENTS_MANY: u32 = 2;

/// Independently fetched inputs for one vehicle; `None` means unavailable.
#[derive(Debug, Clone, Default)]
pub struct VehicleInputs {
    pub weather: Option<WeatherReading>,
    pub sensors: Option<SensorSeries>,
    pub eco_events: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherView {
    pub reading: WeatherReading,
    pub risk: WeatherRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleView {
    pub assessment: RiskAssessment,
    pub trend: RiskTrend,
    pub action: ActionIntelligence,
    pub fuel: Option<FuelAnomalyVerdict>,
    pub weather: Option<WeatherView>,
    pub service: ServiceEstimate,
}

fn eco_points(count: u32) -> i32 {
    match count {
        0 => 0,
        c if c > ECO_EVENTS_MANY => 2,
        _ => 1,
    }
}

/// Score a vehicle, fold in weather, fuel and eco evidence, then derive the
/// trend and action from the combined assessment.
pub fn build_vehicle_view(vehicle: &VehicleTelemetry, inputs: VehicleInputs, now: DateTime<Utc>) -> VehicleView {
    let mut assessment = assess_vehicle(vehicle, now);

    let weather = inputs.weather.map(|reading| {
        let risk = evaluate_weather(&reading);
        WeatherView { reading, risk }
    });
    if let Some(view) = weather.as_ref().filter(|w| w.risk.is_elevated()) {
        let bump = view.risk.weather_risk_bump;
        assessment = assessment.with_contribution(
            RiskReason::Weather {
                bump,
                conditions: view.risk.reasons.clone(),
            },
            i32::from(bump),
        );
    }

    let fuel = inputs.sensors.map(|series| detect_fuel_anomaly(&vehicle.id, &series));
    if let Some(verdict) = fuel.as_ref().filter(|v| v.is_anomaly()) {
        if let (Some(severity), Some(fuel_drop)) = (verdict.severity, verdict.fuel_drop) {
            assessment = assessment.with_contribution(
                RiskReason::FuelAnomaly { severity, fuel_drop },
                i32::from(verdict.risk_impact),
            );
        }
    }

    if let Some(count) = inputs.eco_events.filter(|c| *c > 0) {
        assessment = assessment.with_contribution(RiskReason::EcoEvent { count }, eco_points(count));
    }

    tracing::debug!(
        "Vehicle {} scored {} ({:?}) from {} reasons",
        vehicle.id,
        assessment.risk_score,
        assessment.risk_level,
        assessment.reasons.len()
    );

    VehicleView {
        trend: compute_risk_trend(&assessment),
        action: resolve_action(&assessment),
        service: estimate_service(vehicle),
        assessment,
        fuel,
        weather,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub ok: usize,
}

impl FleetSummary {
    pub fn from_views(views: &[VehicleView]) -> Self {
        views.iter().fold(Self::default(), |mut summary, view| {
            summary.total += 1;
            match view.assessment.risk_level {
                RiskLevel::Critical => summary.critical += 1,
                RiskLevel::Warning => summary.warning += 1,
                RiskLevel::Ok => summary.ok += 1,
            }
            summary
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetReport {
    pub group: String,
    pub generated_at: DateTime<Utc>,
    pub summary: FleetSummary,
    pub vehicles: Vec<VehicleView>,
}

impl FleetReport {
    pub fn new(group: String, generated_at: DateTime<Utc>, vehicles: Vec<VehicleView>) -> Self {
        Self {
            group,
            generated_at,
            summary: FleetSummary::from_views(&vehicles),
            vehicles,
        }
    }
}
