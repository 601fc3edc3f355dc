//! # Governance Errors
//!
//! [`GovernanceError`] wraps every lower-layer failure. [`ErrorKind`] is the
//! stable, machine-readable classification surfaced to callers.

use diiac_core::ValidationError;
use diiac_ledger::{FaultKind, LedgerError};
use diiac_pack::{PackError, StoreError};
use serde::Serialize;

use crate::generator::GenerationError;
use crate::intent::IntentError;

/// Classification of a governance failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A required input (captured intent) does not exist yet.
    PreconditionFailure,
    GenerationFailure,
    StorageFailure,
    /// The ledger is corrupt, fails verification, or is frozen.
    ChainIntegrityFailure,
    /// Two records claim the same predecessor.
    ConcurrencyViolation,
    /// Malformed request input.
    ValidationFailure,
    /// Lookup of an unknown execution or artefact.
    NotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreconditionFailure => "PRECONDITION_FAILURE",
            Self::GenerationFailure => "GENERATION_FAILURE",
            Self::StorageFailure => "STORAGE_FAILURE",
            Self::ChainIntegrityFailure => "CHAIN_INTEGRITY_FAILURE",
            Self::ConcurrencyViolation => "CONCURRENCY_VIOLATION",
            Self::ValidationFailure => "VALIDATION_FAILURE",
            Self::NotFound => "NOT_FOUND",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any failure of a governance operation.
#[derive(Debug, thiserror::Error)]
pub enum GovernanceError {
    #[error("no human intent has been captured; capture intent before executing")]
    NoIntent,

    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("intent store: {0}")]
    Intent(#[from] IntentError),

    #[error("artefact store: {0}")]
    Store(#[from] StoreError),

    #[error("decision pack: {0}")]
    Pack(PackError),

    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<PackError> for GovernanceError {
    fn from(e: PackError) -> Self {
        match e {
            PackError::Store(inner) => Self::Store(inner),
            other => Self::Pack(other),
        }
    }
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoIntent => ErrorKind::PreconditionFailure,
            Self::Validation(_) => ErrorKind::ValidationFailure,
            Self::Generation(_) => ErrorKind::GenerationFailure,
            Self::Intent(_) => ErrorKind::StorageFailure,
            Self::Store(StoreError::ExecutionNotFound(_) | StoreError::ArtefactNotFound { .. }) => {
                ErrorKind::NotFound
            }
            Self::Store(StoreError::InvalidName { .. }) => ErrorKind::ValidationFailure,
            Self::Store(_) => ErrorKind::StorageFailure,
            Self::Pack(PackError::ReportNotObject(_)) => ErrorKind::GenerationFailure,
            Self::Pack(_) => ErrorKind::StorageFailure,
            Self::Ledger(LedgerError::ChainIntegrity {
                kind: FaultKind::Fork,
                ..
            }) => ErrorKind::ConcurrencyViolation,
            Self::Ledger(e) if e.is_integrity_failure() => ErrorKind::ChainIntegrityFailure,
            Self::Ledger(_) => ErrorKind::StorageFailure,
        }
    }
}
