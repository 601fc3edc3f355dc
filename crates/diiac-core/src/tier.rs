//! # Tier Policy Table
//!
//! Two independent dials govern how much a decision pack must contain:
//!
//! - **Reasoning level** (`R0`..`R5`): analytical depth. Each level's
//!   section set contains the previous level's.
//! - **Policy level** (`P0`..`P5`): governance strictness. Each level
//!   contributes at most one extra section; the sets do not nest.
//!
//! [`TierPolicy`] is the only place these sets are written down. Prompt
//! construction for the content generator and the section enforcement
//! engine both call [`TierPolicy::required_sections()`], so the sections a
//! generator is asked for and the sections enforced afterwards cannot drift.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Canonical report section names.
pub mod sections {
    pub const EXECUTIVE_SUMMARY: &str = "executive_summary";
    pub const STRATEGIC_CONTEXT: &str = "strategic_context";
    pub const MARKET_ANALYSIS: &str = "market_analysis";
    pub const RISK_MATRIX: &str = "risk_matrix";
    pub const FINANCIAL_MODEL: &str = "financial_model";
    pub const SCENARIO_ANALYSIS: &str = "scenario_analysis";
    pub const IMPLEMENTATION_ROADMAP: &str = "implementation_roadmap";
    pub const GOVERNANCE_IMPLICATIONS: &str = "governance_implications";
    pub const VENDOR_SCORING: &str = "vendor_scoring";
    pub const BOARD_RECOMMENDATION: &str = "board_recommendation";
    pub const REGULATORY_POSITION: &str = "regulatory_position";
    pub const AUDIT_TRAIL: &str = "audit_trail";
    pub const TRACE_MANIFEST: &str = "trace_manifest";
}

use sections::*;

// ----------------------------------------------------------------------------
// Levels
// ----------------------------------------------------------------------------

/// Analytical depth requested for an execution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum ReasoningLevel {
    R0,
    R1,
    #[default]
    R2,
    R3,
    R4,
    R5,
}

impl ReasoningLevel {
    /// All levels in ascending order.
    pub const ALL: [ReasoningLevel; 6] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::R0 => "R0",
            Self::R1 => "R1",
            Self::R2 => "R2",
            Self::R3 => "R3",
            Self::R4 => "R4",
            Self::R5 => "R5",
        }
    }
}

impl fmt::Display for ReasoningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReasoningLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownReasoningLevel(s.to_string()))
    }
}

/// Governance strictness requested for an execution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum PolicyLevel {
    P0,
    #[default]
    P1,
    P2,
    P3,
    P4,
    P5,
}

impl PolicyLevel {
    /// All levels in ascending order.
    pub const ALL: [PolicyLevel; 6] = [
        Self::P0,
        Self::P1,
        Self::P2,
        Self::P3,
        Self::P4,
        Self::P5,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
            Self::P4 => "P4",
            Self::P5 => "P5",
        }
    }
}

impl fmt::Display for PolicyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownPolicyLevel(s.to_string()))
    }
}

// ----------------------------------------------------------------------------
// Table
// ----------------------------------------------------------------------------

const R1_SECTIONS: &[&str] = &[EXECUTIVE_SUMMARY];
const R2_SECTIONS: &[&str] = &[EXECUTIVE_SUMMARY, STRATEGIC_CONTEXT];
const R3_SECTIONS: &[&str] = &[EXECUTIVE_SUMMARY, STRATEGIC_CONTEXT, MARKET_ANALYSIS];
const R4_SECTIONS: &[&str] = &[
    EXECUTIVE_SUMMARY,
    STRATEGIC_CONTEXT,
    MARKET_ANALYSIS,
    RISK_MATRIX,
];
const R5_SECTIONS: &[&str] = &[
    EXECUTIVE_SUMMARY,
    STRATEGIC_CONTEXT,
    MARKET_ANALYSIS,
    RISK_MATRIX,
    FINANCIAL_MODEL,
    SCENARIO_ANALYSIS,
    IMPLEMENTATION_ROADMAP,
    GOVERNANCE_IMPLICATIONS,
    VENDOR_SCORING,
    BOARD_RECOMMENDATION,
];

/// The static reasoning/policy section table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TierPolicy;

impl TierPolicy {
    /// Sections mandated by a reasoning level, in report order.
    pub fn reasoning_sections(level: ReasoningLevel) -> &'static [&'static str] {
        match level {
            ReasoningLevel::R0 | ReasoningLevel::R1 => R1_SECTIONS,
            ReasoningLevel::R2 => R2_SECTIONS,
            ReasoningLevel::R3 => R3_SECTIONS,
            ReasoningLevel::R4 => R4_SECTIONS,
            ReasoningLevel::R5 => R5_SECTIONS,
        }
    }

    /// Extra sections mandated by a policy level.
    pub fn policy_sections(level: PolicyLevel) -> &'static [&'static str] {
        match level {
            PolicyLevel::P0 | PolicyLevel::P1 => &[],
            PolicyLevel::P2 => &[RISK_MATRIX],
            PolicyLevel::P3 => &[REGULATORY_POSITION],
            PolicyLevel::P4 => &[AUDIT_TRAIL],
            PolicyLevel::P5 => &[TRACE_MANIFEST],
        }
    }

    /// The ordered, de-duplicated union for a tier pair: reasoning sections
    /// first, then any policy extras not already present.
    pub fn required_sections(reasoning: ReasoningLevel, policy: PolicyLevel) -> TierRequirement {
        let mut sections: Vec<&'static str> = Self::reasoning_sections(reasoning).to_vec();
        for extra in Self::policy_sections(policy) {
            if !sections.contains(extra) {
                sections.push(*extra);
            }
        }
        TierRequirement {
            reasoning,
            policy,
            sections,
        }
    }
}

/// The section set a report must contain for one tier pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierRequirement {
    pub reasoning: ReasoningLevel,
    pub policy: PolicyLevel,
    sections: Vec<&'static str>,
}

impl TierRequirement {
    /// Required section names in order.
    pub fn sections(&self) -> &[&'static str] {
        &self.sections
    }

    pub fn contains(&self, section: &str) -> bool {
        self.sections.iter().any(|s| *s == section)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// `R2/P1` style label used in placeholder notes and logs.
    pub fn label(&self) -> String {
        format!("{}/{}", self.reasoning, self.policy)
    }
}
