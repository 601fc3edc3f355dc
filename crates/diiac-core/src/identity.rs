//! # Identity Newtypes
//!
//! Identifiers that flow through the trust layer. An execution id also names
//! the execution's artefact directory, so it must never be confused with a
//! free-form string.
//!
//! Stored identifiers are accepted only in the exact form they are written
//! in. A record hash covers the rendered id, so an alternate spelling of
//! the same UUID (uppercase hex, braces, no hyphens) must not parse.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::ValidationError;

/// Unique identifier for one governed execution (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExecutionId(Uuid);

impl ExecutionId {
    /// Generate a new random execution identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse the lowercase hyphenated UUID form. No other spelling is accepted.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match Uuid::parse_str(s) {
            Ok(id) if id.hyphenated().to_string() == s => Ok(Self(id)),
            _ => Err(ValidationError::InvalidExecutionId(s.to_string())),
        }
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl Serialize for ExecutionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExecutionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Name of the upstream content provider that an execution was attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderId(String);

impl ProviderId {
    const MAX_LEN: usize = 128;

    /// Validate and wrap a provider name. Surrounding whitespace is trimmed.
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = s.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidProvider(raw, "must not be empty"));
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(ValidationError::InvalidProvider(raw, "longer than 128 bytes"));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValidationError::InvalidProvider(
                raw,
                "contains control characters",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The provider name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stored form: must already be trimmed.
impl TryFrom<String> for ProviderId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let provider = Self::new(value.as_str())?;
        if provider.0 != value {
            return Err(ValidationError::InvalidProvider(
                value,
                "surrounding whitespace in stored form",
            ));
        }
        Ok(provider)
    }
}

impl From<ProviderId> for String {
    fn from(value: ProviderId) -> Self {
        value.0
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
