//! # Ledger Records
//!
//! A caller describes an execution with an [`ExecutionRecord`]. The ledger
//! seals it into a [`LedgerRecord`] by attaching the tail link and
//! computing `record_hash`.
//!
//! ## Hash Payload
//!
//! `record_hash` covers every field except itself, serialized through
//! [`CanonicalBytes`] (RFC 8785). Key order on disk therefore has no effect
//! on the hash; field values do.

use std::fmt;

use diiac_core::{
    sha256_digest, CanonicalBytes, ContentDigest, ExecutionId, PolicyLevel, ProviderId,
    ReasoningLevel, Timestamp,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LedgerError;

/// `previous_hash` value of the first record.
pub const GENESIS_SENTINEL: &str = "GENESIS";

/// What a record's `previous_hash` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainLink {
    Genesis,
    Record(ContentDigest),
}

impl ChainLink {
    pub fn is_genesis(&self) -> bool {
        matches!(self, Self::Genesis)
    }
}

impl fmt::Display for ChainLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Genesis => f.write_str(GENESIS_SENTINEL),
            Self::Record(d) => fmt::Display::fmt(d, f),
        }
    }
}

impl Serialize for ChainLink {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChainLink {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == GENESIS_SENTINEL {
            return Ok(Self::Genesis);
        }
        ContentDigest::from_hex(&s)
            .map(Self::Record)
            .map_err(serde::de::Error::custom)
    }
}

/// Kind of event a record commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordType {
    GovernedExecution,
}

/// The caller-supplied part of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRecord {
    pub execution_id: ExecutionId,
    pub provider: ProviderId,
    pub reasoning_level: ReasoningLevel,
    pub policy_level: PolicyLevel,
    pub context_hash: ContentDigest,
    pub pack_hash: ContentDigest,
    pub artefact_count: u64,
    pub timestamp: Timestamp,
}

/// A sealed ledger record, one JSON line on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub execution_id: ExecutionId,
    pub provider: ProviderId,
    pub reasoning_level: ReasoningLevel,
    pub policy_level: PolicyLevel,
    pub context_hash: ContentDigest,
    pub pack_hash: ContentDigest,
    pub artefact_count: u64,
    pub timestamp: Timestamp,
    pub previous_hash: ChainLink,
    pub record_hash: ContentDigest,
}

/// Borrowed view of everything `record_hash` covers.
#[derive(Serialize)]
struct RecordPayload<'a> {
    #[serde(rename = "type")]
    record_type: RecordType,
    execution_id: &'a ExecutionId,
    provider: &'a ProviderId,
    reasoning_level: ReasoningLevel,
    policy_level: PolicyLevel,
    context_hash: &'a ContentDigest,
    pack_hash: &'a ContentDigest,
    artefact_count: u64,
    timestamp: &'a Timestamp,
    previous_hash: &'a ChainLink,
}

fn payload_hash(payload: &RecordPayload<'_>) -> Result<ContentDigest, LedgerError> {
    let canonical = CanonicalBytes::new(payload)?;
    Ok(sha256_digest(&canonical))
}

impl LedgerRecord {
    /// Seal an execution record onto `previous`.
    pub fn seal(record: ExecutionRecord, previous: ChainLink) -> Result<Self, LedgerError> {
        let record_hash = payload_hash(&RecordPayload {
            record_type: RecordType::GovernedExecution,
            execution_id: &record.execution_id,
            provider: &record.provider,
            reasoning_level: record.reasoning_level,
            policy_level: record.policy_level,
            context_hash: &record.context_hash,
            pack_hash: &record.pack_hash,
            artefact_count: record.artefact_count,
            timestamp: &record.timestamp,
            previous_hash: &previous,
        })?;
        Ok(Self {
            record_type: RecordType::GovernedExecution,
            execution_id: record.execution_id,
            provider: record.provider,
            reasoning_level: record.reasoning_level,
            policy_level: record.policy_level,
            context_hash: record.context_hash,
            pack_hash: record.pack_hash,
            artefact_count: record.artefact_count,
            timestamp: record.timestamp,
            previous_hash: previous,
            record_hash,
        })
    }

    /// Recompute `record_hash` from the stored fields.
    pub fn compute_record_hash(&self) -> Result<ContentDigest, LedgerError> {
        payload_hash(&RecordPayload {
            record_type: self.record_type,
            execution_id: &self.execution_id,
            provider: &self.provider,
            reasoning_level: self.reasoning_level,
            policy_level: self.policy_level,
            context_hash: &self.context_hash,
            pack_hash: &self.pack_hash,
            artefact_count: self.artefact_count,
            timestamp: &self.timestamp,
            previous_hash: &self.previous_hash,
        })
    }

    /// Whether the stored `record_hash` matches the stored fields.
    pub fn hash_matches(&self) -> Result<bool, LedgerError> {
        Ok(self.compute_record_hash()? == self.record_hash)
    }

    /// The link a successor record must carry.
    pub fn as_link(&self) -> ChainLink {
        ChainLink::Record(self.record_hash)
    }
}
