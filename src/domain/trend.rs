// Simulated 24h risk trend derived from a single assessment
use serde::Serialize;

use super::risk::{RiskAssessment, RiskReason};

/// Offline longer than this and the vehicle was already offline a day ago.
pub const OFFLINE_DAY_MINUTES: i64 = 1440;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    fn from_delta(delta: i32) -> Self {
        match delta {
            d if d > 0 => TrendDirection::Up,
            d if d < 0 => TrendDirection::Down,
            _ => TrendDirection::Stable,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Up => "Riziko roste",
            TrendDirection::Down => "Riziko klesá",
            TrendDirection::Stable => "Stabilní",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TrendDirection::Up => "🔺",
            TrendDirection::Down => "🔻",
            TrendDirection::Stable => "➖",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskTrend {
    /// Current score minus the simulated score 24h ago; positive means rising.
    pub delta: i32,
    pub direction: TrendDirection,
    pub label: &'static str,
    pub symbol: &'static str,
}

fn simulated_prior_score(assessment: &RiskAssessment) -> i32 {
    if assessment.risk_score == 0 {
        return 0;
    }

    let reasons = &assessment.reasons;
    let mut prior = assessment.risk_score;

    let critical_offline = reasons.iter().find_map(RiskReason::critical_offline_minutes);
    let moderate_offline = reasons.iter().any(|r| matches!(r, RiskReason::NoUpdate { .. }));

    match critical_offline {
        Some(minutes) if minutes < OFFLINE_DAY_MINUTES => prior -= 4,
        Some(_) => {}
        None if moderate_offline => prior -= 1,
        None => {}
    }

    if reasons.iter().any(|r| matches!(r, RiskReason::SpeedExtreme { .. })) {
        prior -= 2;
    }

    let eco_count = reasons.iter().find_map(|r| match r {
        RiskReason::EcoEvent { count } => Some(*count),
        _ => None,
    });
    match eco_count {
        Some(count) if count > 2 => prior -= 2,
        Some(count) if count >= 1 => prior -= 1,
        _ => {}
    }

    prior.max(0)
}

pub fn compute_risk_trend(assessment: &RiskAssessment) -> RiskTrend {
    let delta = assessment.risk_score - simulated_prior_score(assessment);
    let direction = TrendDirection::from_delta(delta);

    RiskTrend {
        delta,
        direction,
        label: direction.label(),
        symbol: direction.symbol(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::risk::RiskLevel;
    use chrono::{TimeZone, Utc};

    fn assessment(score: i32, reasons: Vec<RiskReason>) -> RiskAssessment {
        RiskAssessment {
            vehicle_id: "V1".to_string(),
            vehicle_name: "Truck".to_string(),
            plate: String::new(),
            speed: 0.0,
            risk_score: score,
            risk_level: RiskLevel::from_score(score),
            reasons,
            calculated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            last_position: None,
        }
    }

    #[test]
    fn test_clean_vehicle_is_stable() {
        let trend = compute_risk_trend(&assessment(0, vec![]));
        assert_eq!(trend.delta, 0);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.label, "Stabilní");
    }

    #[test]
    fn test_recent_critical_offline_rises() {
        let trend = compute_risk_trend(&assessment(
            3,
            vec![RiskReason::NoUpdateCritical { minutes: Some(400) }],
        ));
        assert_eq!(trend.delta, 3);
        assert_eq!(trend.direction, TrendDirection::Up);
    }

    #[test]
    fn test_long_offline_is_stable() {
        let day_plus = assessment(3, vec![RiskReason::NoUpdateCritical { minutes: Some(1440) }]);
        assert_eq!(compute_risk_trend(&day_plus).direction, TrendDirection::Stable);

        let unknown = assessment(3, vec![RiskReason::NoUpdateCritical { minutes: None }]);
        assert_eq!(compute_risk_trend(&unknown).delta, 0);
    }

    #[test]
    fn test_moderate_offline_and_extreme_speed() {
        let trend = compute_risk_trend(&assessment(
            6,
            vec![
                RiskReason::SpeedExtreme { speed: 140.0 },
                RiskReason::NoUpdate { minutes: 100 },
            ],
        ));
        assert_eq!(trend.delta, 3);
    }

    #[test]
    fn test_eco_event_counts() {
        let few = assessment(2, vec![RiskReason::SpeedAboveLimit { speed: 100.0 }, RiskReason::EcoEvent { count: 2 }]);
        assert_eq!(compute_risk_trend(&few).delta, 1);

        let many = assessment(4, vec![RiskReason::SpeedAboveLimit { speed: 100.0 }, RiskReason::EcoEvent { count: 5 }]);
        assert_eq!(compute_risk_trend(&many).delta, 2);
    }

    #[test]
    fn test_prior_score_floor_is_zero() {
        let trend = compute_risk_trend(&assessment(
            2,
            vec![
                RiskReason::SpeedExtreme { speed: 135.0 },
                RiskReason::NoUpdateCritical { minutes: Some(500) },
            ],
        ));
        assert_eq!(trend.delta, 2);
        assert_eq!(trend.direction, TrendDirection::Up);
    }

    #[test]
    fn test_unexplained_score_is_stable() {
        let trend = compute_risk_trend(&assessment(2, vec![RiskReason::SpeedAboveLimit { speed: 100.0 }]));
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.symbol, "➖");
    }
}
