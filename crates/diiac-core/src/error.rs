//! # Error Types
//!
//! Leaf error types shared by every crate in the workspace. Higher layers
//! wrap these with `#[from]`.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A value supplied from outside the trust layer failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Reasoning level is not one of `R0`..`R5`.
    #[error("unknown reasoning level {0:?}; expected R0..R5")]
    UnknownReasoningLevel(String),

    /// Policy level is not one of `P0`..`P5`.
    #[error("unknown policy level {0:?}; expected P0..P5")]
    UnknownPolicyLevel(String),

    /// Digest is not 64 lowercase hex characters.
    #[error("invalid digest {0:?}; expected 64 lowercase hex characters")]
    InvalidDigest(String),

    /// Execution identifier is not a UUID.
    #[error("invalid execution id {0:?}")]
    InvalidExecutionId(String),

    /// Provider identifier is empty or too long.
    #[error("invalid provider {0:?}: {1}")]
    InvalidProvider(String, &'static str),

    /// Timestamp is not an RFC 3339 UTC instant with `Z` suffix.
    #[error("invalid timestamp {0:?}: {1}")]
    InvalidTimestamp(String, String),
}
