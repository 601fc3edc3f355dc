//! # Ledger
//!
//! Owns a [`LedgerStorage`] and serializes every operation on it.
//!
//! ## Append
//!
//! Under the lock: read the tail, confirm the tail record still matches its
//! own hash, link the new record to it, seal, persist. Only the tail is
//! read; earlier records are checked by [`Ledger::verify`]. The lock is a
//! blocking `parking_lot::Mutex`; callers must not hold it across an
//! `.await` (the API exposes no guard, so they cannot).
//!
//! Appends block the calling thread for one synced write.
//!
//! ## Verify
//!
//! Walks the full chain checking, per record:
//!
//! 1. `previous_hash` has not been used by an earlier record (fork).
//! 2. `previous_hash` equals the preceding record's `record_hash`
//!    (or the genesis sentinel for the first record).
//! 3. `record_hash` equals the recomputed payload hash.
//!
//! The first fault invalidates the chain from that record onward.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::LedgerError;
use crate::record::{ChainLink, ExecutionRecord, LedgerRecord};
use crate::storage::{JsonlLedgerStorage, LedgerStorage, MemoryLedgerStorage};

/// What went wrong at a faulty record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Stored `record_hash` does not match the stored fields.
    RecordHashMismatch,
    /// `previous_hash` does not match the preceding record.
    BrokenLink,
    /// `previous_hash` was already claimed by an earlier record.
    Fork,
}

impl FaultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecordHashMismatch => "record_hash_mismatch",
            Self::BrokenLink => "broken_link",
            Self::Fork => "fork",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First fault found by verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainFault {
    /// Zero-based record index.
    pub index: usize,
    pub kind: FaultKind,
}

/// Result of walking the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainVerification {
    pub valid: bool,
    /// Total number of stored records.
    pub length: usize,
    /// Records verified before the first fault (equals `length` when valid).
    pub verified: usize,
    /// `record_hash` of the last stored record, or genesis when empty.
    pub ledger_root: ChainLink,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<ChainFault>,
}

/// Verify a record sequence. Pure; does not touch storage.
pub fn verify_chain(records: &[LedgerRecord]) -> Result<ChainVerification, LedgerError> {
    let ledger_root = records
        .last()
        .map(LedgerRecord::as_link)
        .unwrap_or(ChainLink::Genesis);
    let mut expected = ChainLink::Genesis;
    let mut claimed: HashSet<ChainLink> = HashSet::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let kind = if !claimed.insert(record.previous_hash) {
            Some(FaultKind::Fork)
        } else if record.previous_hash != expected {
            Some(FaultKind::BrokenLink)
        } else if !record.hash_matches()? {
            Some(FaultKind::RecordHashMismatch)
        } else {
            None
        };
        if let Some(kind) = kind {
            return Ok(ChainVerification {
                valid: false,
                length: records.len(),
                verified: index,
                ledger_root,
                fault: Some(ChainFault { index, kind }),
            });
        }
        expected = record.as_link();
    }

    Ok(ChainVerification {
        valid: true,
        length: records.len(),
        verified: records.len(),
        ledger_root,
        fault: None,
    })
}

struct LedgerState {
    storage: Box<dyn LedgerStorage>,
    frozen: bool,
}

impl LedgerState {
    fn freeze(&mut self, reason: &dyn fmt::Display) {
        if !self.frozen {
            tracing::error!(%reason, "ledger frozen");
        }
        self.frozen = true;
    }

    fn freeze_on_corruption(&mut self, e: LedgerError) -> LedgerError {
        if e.is_integrity_failure() {
            self.freeze(&e);
        }
        e
    }

    /// Run a storage read, freezing on corruption.
    fn read_all(&mut self) -> Result<Vec<LedgerRecord>, LedgerError> {
        self.storage.read_all().map_err(|e| self.freeze_on_corruption(e))
    }

    fn last(&mut self) -> Result<Option<LedgerRecord>, LedgerError> {
        self.storage.last().map_err(|e| self.freeze_on_corruption(e))
    }
}

/// The hash-chained ledger.
pub struct Ledger {
    state: Mutex<LedgerState>,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("frozen", &self.is_frozen())
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Wrap any storage backend.
    pub fn new(storage: impl LedgerStorage + 'static) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                storage: Box::new(storage),
                frozen: false,
            }),
        }
    }

    /// A ledger persisted as JSON lines at `path`.
    pub fn open_jsonl(path: impl Into<PathBuf>) -> Self {
        Self::new(JsonlLedgerStorage::new(path))
    }

    /// A ledger held in memory.
    pub fn in_memory() -> Self {
        Self::new(MemoryLedgerStorage::new())
    }

    /// Whether an integrity failure has frozen this ledger.
    pub fn is_frozen(&self) -> bool {
        self.state.lock().frozen
    }

    /// Seal `record` onto the current tail and persist it.
    pub fn append(&self, record: ExecutionRecord) -> Result<LedgerRecord, LedgerError> {
        let mut state = self.state.lock();
        if state.frozen {
            return Err(LedgerError::Frozen);
        }

        let previous = match state.last()? {
            None => ChainLink::Genesis,
            Some(last) => {
                if !last.hash_matches()? {
                    let err = LedgerError::ChainIntegrity {
                        index: state.read_all()?.len().saturating_sub(1),
                        kind: FaultKind::RecordHashMismatch,
                    };
                    state.freeze(&err);
                    return Err(err);
                }
                last.as_link()
            }
        };

        let sealed = LedgerRecord::seal(record, previous)?;
        state.storage.append(&sealed)?;
        tracing::info!(
            execution_id = %sealed.execution_id,
            record_hash = %sealed.record_hash,
            previous_hash = %sealed.previous_hash,
            "ledger record sealed"
        );
        Ok(sealed)
    }

    /// `record_hash` of the last record, or genesis when empty.
    pub fn tail_hash(&self) -> Result<ChainLink, LedgerError> {
        Ok(self
            .state
            .lock()
            .last()?
            .map(|r| r.as_link())
            .unwrap_or(ChainLink::Genesis))
    }

    /// All records in order.
    pub fn records(&self) -> Result<Vec<LedgerRecord>, LedgerError> {
        self.state.lock().read_all()
    }

    pub fn record_count(&self) -> Result<usize, LedgerError> {
        Ok(self.records()?.len())
    }

    /// Verify the whole chain. Freezes the ledger if it is invalid.
    pub fn verify(&self) -> Result<ChainVerification, LedgerError> {
        let mut state = self.state.lock();
        let records = state.read_all()?;
        let report = verify_chain(&records)?;
        if let Some(fault) = report.fault {
            tracing::warn!(index = fault.index, kind = %fault.kind, length = report.length, "ledger verification failed");
            state.freeze(&fault.kind);
        }
        Ok(report)
    }
}
