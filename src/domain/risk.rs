// Core risk engine - speed and staleness scoring for one vehicle
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::fuel::FuelSeverity;
use super::vehicle::{Position, VehicleTelemetry};

pub const SPEED_EXTREME_KMH: f64 = 130.0;
pub const SPEED_HIGH_KMH: f64 = 110.0;
pub const SPEED_ABOVE_LIMIT_KMH: f64 = 95.0;
pub const SPEED_SLIGHTLY_ELEVATED_KMH: f64 = 85.0;

pub const STALE_LONG_MINUTES: f64 = 180.0;
pub const STALE_MEDIUM_MINUTES: f64 = 60.0;
pub const STALE_SHORT_MINUTES: f64 = 15.0;
/// Beyond this many minutes a stale update is reported as critical.
pub const CRITICAL_STALE_MINUTES: i64 = 360;

pub const WARNING_SCORE: i32 = 3;
pub const CRITICAL_SCORE: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Ok,
    Warning,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: i32) -> Self {
        if score >= CRITICAL_SCORE {
            RiskLevel::Critical
        } else if score >= WARNING_SCORE {
            RiskLevel::Warning
        } else {
            RiskLevel::Ok
        }
    }
}

/// Evidence behind a risk score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RiskReason {
    SpeedExtreme { speed: f64 },
    SpeedHigh { speed: f64 },
    SpeedAboveLimit { speed: f64 },
    SpeedSlightlyElevated { speed: f64 },
    NoUpdate { minutes: i64 },
    /// `minutes` is `None` when the last position timestamp was unreadable.
    NoUpdateCritical { minutes: Option<i64> },
    EcoEvent { count: u32 },
    Weather { bump: u8, conditions: Vec<String> },
    FuelAnomaly { severity: FuelSeverity, fuel_drop: f64 },
}

impl RiskReason {
    /// Minutes offline for a critical staleness reason, unknown counted as forever.
    pub fn critical_offline_minutes(&self) -> Option<i64> {
        match self {
            RiskReason::NoUpdateCritical { minutes } => Some(minutes.unwrap_or(i64::MAX)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub vehicle_id: String,
    pub vehicle_name: String,
    pub plate: String,
    pub speed: f64,
    pub risk_score: i32,
    pub risk_level: RiskLevel,
    pub reasons: Vec<RiskReason>,
    pub calculated_at: DateTime<Utc>,
    pub last_position: Option<Position>,
}

impl RiskAssessment {
    /// Append caller-side evidence and re-derive the level on the combined score.
    pub fn with_contribution(mut self, reason: RiskReason, points: i32) -> Self {
        self.risk_score += points;
        self.risk_level = RiskLevel::from_score(self.risk_score);
        self.reasons.push(reason);
        self
    }

    pub fn has_reason(&self, predicate: impl Fn(&RiskReason) -> bool) -> bool {
        self.reasons.iter().any(predicate)
    }
}

fn speed_rule(speed: f64) -> Option<(i32, RiskReason)> {
    if speed > SPEED_EXTREME_KMH {
        Some((4, RiskReason::SpeedExtreme { speed }))
    } else if speed > SPEED_HIGH_KMH {
        Some((3, RiskReason::SpeedHigh { speed }))
    } else if speed > SPEED_ABOVE_LIMIT_KMH {
        Some((2, RiskReason::SpeedAboveLimit { speed }))
    } else if speed > SPEED_SLIGHTLY_ELEVATED_KMH {
        Some((1, RiskReason::SpeedSlightlyElevated { speed }))
    } else {
        None
    }
}

fn staleness_rule(last_seen: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<(i32, RiskReason)> {
    let Some(last_seen) = last_seen else {
        return Some((3, RiskReason::NoUpdateCritical { minutes: None }));
    };

    let minutes_since = (now - last_seen).num_milliseconds() as f64 / 60_000.0;
    let minutes = minutes_since.floor() as i64;

    let points = if minutes_since > STALE_LONG_MINUTES {
        3
    } else if minutes_since > STALE_MEDIUM_MINUTES {
        2
    } else if minutes_since > STALE_SHORT_MINUTES {
        1
    } else {
        return None;
    };

    let reason = if minutes > CRITICAL_STALE_MINUTES {
        RiskReason::NoUpdateCritical { minutes: Some(minutes) }
    } else {
        RiskReason::NoUpdate { minutes }
    };

    Some((points, reason))
}

/// Score one telemetry snapshot at wall-clock time `now`.
pub fn assess_vehicle(vehicle: &VehicleTelemetry, now: DateTime<Utc>) -> RiskAssessment {
    let mut risk_score = 0;
    let mut reasons = Vec::new();

    let last_seen = vehicle.last_position_at();
    if last_seen.is_none() {
        tracing::debug!(
            "Vehicle {} has unreadable position timestamp {:?}",
            vehicle.id,
            vehicle.last_position_time
        );
    }

    for (points, reason) in [speed_rule(vehicle.speed), staleness_rule(last_seen, now)]
        .into_iter()
        .flatten()
    {
        risk_score += points;
        reasons.push(reason);
    }

    RiskAssessment {
        vehicle_id: vehicle.id.clone(),
        vehicle_name: vehicle.name.clone(),
        plate: vehicle.plate.clone(),
        speed: vehicle.speed,
        risk_score,
        risk_level: RiskLevel::from_score(risk_score),
        reasons,
        calculated_at: now,
        last_position: vehicle.position,
    }
}
