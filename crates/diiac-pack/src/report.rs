//! # Governed Report
//!
//! A report is a map from section name to [`Section`]. A section is either
//! content returned by the external generator or a placeholder inserted by
//! enforcement. The two are distinct variants, never an untyped JSON blob
//! with a magic key.
//!
//! ## Wire Form
//!
//! AI-authored sections serialize as their JSON content verbatim. Enforced
//! placeholders serialize as `{"enforced": true, "note": "..."}`, and an
//! object of exactly that shape deserializes back to [`Section::Enforced`].
//!
//! That shape is only recognised when reading a stored report. Generator
//! output goes through [`GovernedReport::from_value`], where every member is
//! [`Section::AiAuthored`] whatever it looks like, so only enforcement can
//! mark a section as a placeholder.
//!
//! A section whose content is JSON `null` is treated as absent: it is
//! dropped on construction, so enforcement sees it as missing.

use std::collections::BTreeMap;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PackError;

/// One report section.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// Content produced by the external generator.
    AiAuthored(Value),
    /// Placeholder injected because the section was required but missing.
    Enforced { note: String },
}

impl Section {
    pub fn is_enforced(&self) -> bool {
        matches!(self, Self::Enforced { .. })
    }

    fn to_value(&self) -> Value {
        match self {
            Self::AiAuthored(v) => v.clone(),
            Self::Enforced { note } => serde_json::json!({
                "enforced": true,
                "note": note,
            }),
        }
    }

    fn from_stored(value: Value) -> Self {
        if let Value::Object(map) = &value {
            if map.len() == 2 && map.get("enforced") == Some(&Value::Bool(true)) {
                if let Some(Value::String(note)) = map.get("note") {
                    return Self::Enforced { note: note.clone() };
                }
            }
        }
        Self::AiAuthored(value)
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Section {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_stored)
    }
}

/// A report keyed by section name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GovernedReport {
    sections: BTreeMap<String, Section>,
}

impl GovernedReport {
    /// An empty report. Used when generation is disabled.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a report from a generator's JSON output.
    ///
    /// The output must be an object. `null` members are dropped. Every
    /// remaining member is AI-authored.
    pub fn from_value(value: Value) -> Result<Self, PackError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map, Section::AiAuthored)),
            other => Err(PackError::ReportNotObject(json_kind(&other))),
        }
    }

    fn from_map(map: Map<String, Value>, section: fn(Value) -> Section) -> Self {
        let sections = map
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k, section(v)))
            .collect();
        Self { sections }
    }

    /// Whether a section is present.
    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Insert a section only if none exists under `name`.
    ///
    /// Returns `true` if the section was inserted. Existing content is never
    /// replaced.
    pub fn insert_if_absent(&mut self, name: &str, section: Section) -> bool {
        if self.sections.contains_key(name) {
            return false;
        }
        self.sections.insert(name.to_string(), section);
        true
    }

    /// Sections in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl<'de> Deserialize<'de> for GovernedReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer)
            .map(|map| Self::from_map(map, Section::from_stored))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
