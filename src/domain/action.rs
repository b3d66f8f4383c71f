// Operational urgency derived from a risk assessment
use serde::Serialize;

use super::risk::{CRITICAL_SCORE, CRITICAL_STALE_MINUTES, RiskAssessment, RiskReason, WARNING_SCORE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionLevel {
    Immediate,
    Soon,
    Monitor,
}

impl ActionLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ActionLevel::Immediate => "Okamžitě řešit",
            ActionLevel::Soon => "Vyžaduje pozornost",
            ActionLevel::Monitor => "Monitorovat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionIntelligence {
    pub level: ActionLevel,
    pub label: &'static str,
}

impl From<ActionLevel> for ActionIntelligence {
    fn from(level: ActionLevel) -> Self {
        Self {
            level,
            label: level.label(),
        }
    }
}

/// First matching rule wins: immediate, soon, monitor.
pub fn resolve_action(assessment: &RiskAssessment) -> ActionIntelligence {
    let long_offline = assessment.has_reason(|r| {
        r.critical_offline_minutes()
            .is_some_and(|minutes| minutes >= CRITICAL_STALE_MINUTES)
    });
    let speed_extreme = assessment.has_reason(|r| matches!(r, RiskReason::SpeedExtreme { .. }));

    let level = if assessment.risk_score >= CRITICAL_SCORE && (long_offline || speed_extreme) {
        ActionLevel::Immediate
    } else if assessment.risk_score >= WARNING_SCORE {
        ActionLevel::Soon
    } else {
        ActionLevel::Monitor
    };

    level.into()
}
