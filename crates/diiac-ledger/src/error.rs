//! # Ledger Errors

use std::path::PathBuf;

use diiac_core::CanonicalizationError;
use thiserror::Error;

use crate::ledger::FaultKind;

/// Errors from ledger persistence, sealing, and verification.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A stored line could not be decoded. Never skipped.
    #[error("corrupt ledger record at line {line}: {reason}")]
    CorruptRecord { line: usize, reason: String },

    /// The chain failed an integrity check.
    #[error("ledger chain integrity failure at record {index}: {kind}")]
    ChainIntegrity { index: usize, kind: FaultKind },

    /// The ledger is frozen after an earlier integrity failure.
    #[error("ledger is frozen after an integrity failure; appends are refused")]
    Frozen,

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LedgerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the stored chain itself is untrustworthy,
    /// as opposed to an environmental failure such as I/O.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::CorruptRecord { .. } | Self::ChainIntegrity { .. } | Self::Frozen
        )
    }
}
