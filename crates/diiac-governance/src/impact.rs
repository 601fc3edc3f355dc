//! Policy impact assessment.
//!
//! A static severity rating per policy level. No findings are computed yet;
//! the shape is fixed so callers can rely on it.

use diiac_core::{PolicyLevel, Timestamp};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn for_policy(level: PolicyLevel) -> Self {
        match level {
            PolicyLevel::P0 | PolicyLevel::P1 => Self::Low,
            PolicyLevel::P2 | PolicyLevel::P3 => Self::Medium,
            PolicyLevel::P4 => Self::High,
            PolicyLevel::P5 => Self::Critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyImpact {
    pub policy_level: PolicyLevel,
    pub severity: Severity,
    pub impacted_controls: u32,
    pub findings: u32,
    pub evaluated_at: Timestamp,
}

/// Controls touched by any policy above P0.
const IMPACTED_CONTROLS: u32 = 3;

pub fn assess_policy_impact(policy_level: PolicyLevel) -> PolicyImpact {
    PolicyImpact {
        policy_level,
        severity: Severity::for_policy(policy_level),
        impacted_controls: if policy_level == PolicyLevel::P0 {
            0
        } else {
            IMPACTED_CONTROLS
        },
        findings: 0,
        evaluated_at: Timestamp::now(),
    }
}
