//! # Decision Summary Artefact
//!
//! `decision_summary.json` is the primary artefact of every execution. It
//! carries the enforced report together with the tier and the record of
//! which sections enforcement had to inject. For `R5` executions the
//! enforced report is also written alone as `strategy_report.json`.

use diiac_core::{ContentDigest, ExecutionId, PolicyLevel, ProviderId, ReasoningLevel, Timestamp};
use serde::{Deserialize, Serialize};

use crate::manifest::GOVERNANCE_CONTRACT_ID;
use crate::report::GovernedReport;

pub const DECISION_SUMMARY_FILE: &str = "decision_summary.json";
pub const STRATEGY_REPORT_FILE: &str = "strategy_report.json";

/// Pack classification stamped on every summary.
pub const CLASSIFICATION_BOARD_READY: &str = "BOARD_READY";

/// Which sections enforcement injected, and for which tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierEnforcement {
    pub reasoning_level: ReasoningLevel,
    pub policy_level: PolicyLevel,
    pub enforced_sections: Vec<String>,
    pub enforcement_timestamp: Timestamp,
}

/// Contents of `decision_summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSummary {
    pub execution_id: ExecutionId,
    pub provider: ProviderId,
    pub reasoning_level: ReasoningLevel,
    pub policy_level: PolicyLevel,
    pub governance_contract: String,
    pub generated_at: Timestamp,
    pub classification: String,
    pub context_hash: ContentDigest,
    pub report: GovernedReport,
    pub tier_enforcement: TierEnforcement,
}

impl DecisionSummary {
    pub fn new(
        execution_id: ExecutionId,
        provider: ProviderId,
        context_hash: ContentDigest,
        report: GovernedReport,
        tier_enforcement: TierEnforcement,
        generated_at: Timestamp,
    ) -> Self {
        Self {
            execution_id,
            provider,
            reasoning_level: tier_enforcement.reasoning_level,
            policy_level: tier_enforcement.policy_level,
            governance_contract: GOVERNANCE_CONTRACT_ID.to_string(),
            generated_at,
            classification: CLASSIFICATION_BOARD_READY.to_string(),
            context_hash,
            report,
            tier_enforcement,
        }
    }

    /// Whether the tier calls for a standalone strategy report artefact.
    pub fn wants_strategy_report(&self) -> bool {
        self.reasoning_level == ReasoningLevel::R5
    }
}
