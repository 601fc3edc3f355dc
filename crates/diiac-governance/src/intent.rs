//! # Human-Intent Capture
//!
//! Intent documents are stored as `<unix-millis>.json`. The latest document
//! is the one with the lexicographically greatest name. The orchestrator
//! hashes the raw stored bytes, so a document is never re-serialized after
//! capture.
//!
//! A capture is written and synced under a temporary dot-name first, then
//! moved to its final name without replacing an existing file. A document
//! is therefore either fully visible to [`IntentStore::latest()`] or absent.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use diiac_core::{sha256_bytes, ContentDigest};
use parking_lot::RwLock;
use serde_json::Value;

/// Errors from intent capture and lookup.
#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    #[error("intent store I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("intent document is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn io_err(path: &Path, source: std::io::Error) -> IntentError {
    IntentError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// A captured intent document exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl IntentDocument {
    /// SHA-256 of the stored bytes.
    pub fn context_hash(&self) -> ContentDigest {
        sha256_bytes(&self.bytes)
    }

    /// Parse the stored bytes as JSON.
    pub fn to_json(&self) -> Result<Value, IntentError> {
        Ok(serde_json::from_slice(&self.bytes)?)
    }
}

/// Storage for captured human intent.
pub trait IntentStore: Send + Sync {
    /// Persist a document and return its stored name.
    fn capture(&self, document: &Value) -> Result<String, IntentError>;

    /// The most recently captured document, or `None` if nothing was captured.
    fn latest(&self) -> Result<Option<IntentDocument>, IntentError>;
}

fn is_intent_name(name: &str) -> bool {
    name.strip_suffix(".json")
        .is_some_and(|stem| !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()))
}

/// Directory-backed intent store.
#[derive(Debug, Clone)]
pub struct FsIntentStore {
    dir: PathBuf,
}

impl FsIntentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl IntentStore for FsIntentStore {
    fn capture(&self, document: &Value) -> Result<String, IntentError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        let bytes = serde_json::to_vec_pretty(document)?;

        let mut staged = tempfile::Builder::new()
            .prefix(".intent-")
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(|e| io_err(&self.dir, e))?;
        staged
            .write_all(&bytes)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|e| io_err(staged.path(), e))?;

        // Two captures in the same millisecond take consecutive names.
        let mut millis = chrono::Utc::now().timestamp_millis();
        loop {
            let name = format!("{millis}.json");
            let path = self.dir.join(&name);
            match staged.persist_noclobber(&path) {
                Ok(_) => {
                    tracing::info!(name = %name, bytes = bytes.len(), "human intent captured");
                    return Ok(name);
                }
                Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                    staged = e.file;
                    millis += 1;
                }
                Err(e) => return Err(io_err(&path, e.error)),
            }
        }
    }

    fn latest(&self) -> Result<Option<IntentDocument>, IntentError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(&self.dir, e)),
        };
        let mut newest: Option<String> = None;
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&self.dir, e))?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if is_intent_name(&name) && newest.as_ref().map_or(true, |n| name > *n) {
                newest = Some(name);
            }
        }
        let Some(name) = newest else {
            return Ok(None);
        };
        let path = self.dir.join(&name);
        let bytes = fs::read(&path).map_err(|e| io_err(&path, e))?;
        Ok(Some(IntentDocument { name, bytes }))
    }
}

/// In-memory intent store.
#[derive(Debug, Default)]
pub struct MemoryIntentStore {
    documents: RwLock<Vec<IntentDocument>>,
}

impl MemoryIntentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IntentStore for MemoryIntentStore {
    fn capture(&self, document: &Value) -> Result<String, IntentError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let mut docs = self.documents.write();
        let name = format!("{}.json", docs.len() + 1);
        docs.push(IntentDocument {
            name: name.clone(),
            bytes,
        });
        Ok(name)
    }

    fn latest(&self) -> Result<Option<IntentDocument>, IntentError> {
        Ok(self.documents.read().last().cloned())
    }
}
