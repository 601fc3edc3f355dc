//! # Pack Errors

use std::path::PathBuf;

use diiac_core::ExecutionId;
use thiserror::Error;

/// Failure in the per-execution artefact store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// An artefact directory already exists for this execution.
    #[error("artefact directory for execution {0} already exists")]
    ExecutionExists(ExecutionId),

    /// No artefact directory exists for this execution.
    #[error("no artefacts for execution {0}")]
    ExecutionNotFound(ExecutionId),

    /// The named artefact was already written. Artefacts are write-once.
    #[error("artefact {name:?} already exists for execution {execution_id}")]
    ArtefactExists {
        execution_id: ExecutionId,
        name: String,
    },

    /// The named artefact does not exist.
    #[error("artefact {name:?} not found for execution {execution_id}")]
    ArtefactNotFound {
        execution_id: ExecutionId,
        name: String,
    },

    /// Artefact names are single path components from a restricted alphabet.
    #[error("invalid artefact name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// Underlying filesystem failure.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure while assembling a decision pack.
#[derive(Error, Debug)]
pub enum PackError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A generated report was not a JSON object.
    #[error("report must be a JSON object, got {0}")]
    ReportNotObject(&'static str),

    /// The stored manifest could not be parsed.
    #[error("manifest for execution {execution_id} is unreadable: {source}")]
    ManifestUnreadable {
        execution_id: ExecutionId,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
