//! # Artefact Store
//!
//! Per-execution artefact directories. The filesystem layout is
//! `{base_dir}/{execution_id}/artefacts/{name}`.
//!
//! ## Invariants
//!
//! - An execution directory is created exclusively. A second
//!   `create_execution` for the same id fails, so two executions can never
//!   share artefacts.
//! - Artefacts are write-once (`create_new`).
//! - [`ArtefactStore::list()`] returns names in ascending byte order. The
//!   manifest builder relies on this for a reproducible pack hash.
//! - Artefact names are single path components drawn from
//!   `[A-Za-z0-9._-]` and never start with `.`.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use diiac_core::ExecutionId;
use parking_lot::RwLock;

use crate::error::StoreError;

const MAX_NAME_LEN: usize = 255;

/// Validate an artefact file name.
pub fn validate_artefact_name(name: &str) -> Result<(), StoreError> {
    let invalid = |reason| StoreError::InvalidName {
        name: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("longer than 255 bytes"));
    }
    if name.starts_with('.') {
        return Err(invalid("must not start with '.'"));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
    {
        return Err(invalid("must match [A-Za-z0-9._-]"));
    }
    Ok(())
}

/// Storage for per-execution artefact files.
pub trait ArtefactStore: Send + Sync {
    /// Create the artefact directory for a new execution. Fails if it exists.
    fn create_execution(&self, execution_id: &ExecutionId) -> Result<(), StoreError>;

    /// Write a new artefact. Fails if the name is already taken.
    fn write(&self, execution_id: &ExecutionId, name: &str, bytes: &[u8])
        -> Result<(), StoreError>;

    /// Read an artefact's full contents.
    fn read(&self, execution_id: &ExecutionId, name: &str) -> Result<Vec<u8>, StoreError>;

    /// Artefact names in ascending lexicographic order.
    fn list(&self, execution_id: &ExecutionId) -> Result<Vec<String>, StoreError>;

    /// Remove an execution's artefacts. Used to clean up after a failed
    /// execution; a missing directory is not an error.
    fn discard(&self, execution_id: &ExecutionId) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Filesystem
// ---------------------------------------------------------------------------

/// Filesystem-backed artefact store.
#[derive(Debug, Clone)]
pub struct FsArtefactStore {
    base_dir: PathBuf,
}

impl FsArtefactStore {
    /// Create a store rooted at `base_dir`. The directory is created lazily.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn execution_dir(&self, execution_id: &ExecutionId) -> PathBuf {
        self.base_dir.join(execution_id.to_string())
    }

    fn artefact_dir(&self, execution_id: &ExecutionId) -> PathBuf {
        self.execution_dir(execution_id).join("artefacts")
    }

    fn existing_artefact_dir(&self, execution_id: &ExecutionId) -> Result<PathBuf, StoreError> {
        let dir = self.artefact_dir(execution_id);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(StoreError::ExecutionNotFound(*execution_id))
        }
    }
}

impl ArtefactStore for FsArtefactStore {
    fn create_execution(&self, execution_id: &ExecutionId) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base_dir).map_err(|e| StoreError::io(&self.base_dir, e))?;
        let exec_dir = self.execution_dir(execution_id);
        // `create_dir` (not `_all`) is the exclusivity check.
        match fs::create_dir(&exec_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StoreError::ExecutionExists(*execution_id));
            }
            Err(e) => return Err(StoreError::io(&exec_dir, e)),
        }
        let dir = self.artefact_dir(execution_id);
        fs::create_dir(&dir).map_err(|e| StoreError::io(&dir, e))?;
        tracing::debug!(execution_id = %execution_id, dir = %dir.display(), "created artefact directory");
        Ok(())
    }

    fn write(
        &self,
        execution_id: &ExecutionId,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), StoreError> {
        validate_artefact_name(name)?;
        let path = self.existing_artefact_dir(execution_id)?.join(name);
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StoreError::ArtefactExists {
                    execution_id: *execution_id,
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        file.write_all(bytes).map_err(|e| StoreError::io(&path, e))?;
        file.sync_all().map_err(|e| StoreError::io(&path, e))?;
        Ok(())
    }

    fn read(&self, execution_id: &ExecutionId, name: &str) -> Result<Vec<u8>, StoreError> {
        validate_artefact_name(name)?;
        let path = self.existing_artefact_dir(execution_id)?.join(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::ArtefactNotFound {
                execution_id: *execution_id,
                name: name.to_string(),
            }),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    fn list(&self, execution_id: &ExecutionId) -> Result<Vec<String>, StoreError> {
        let dir = self.existing_artefact_dir(execution_id)?;
        let entries = fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
            let file_type = entry.file_type().map_err(|e| StoreError::io(entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            // Names that are not valid UTF-8 or fail validation were not
            // written through this store and are not part of the pack.
            match entry.file_name().into_string() {
                Ok(name) if validate_artefact_name(&name).is_ok() => names.push(name),
                Ok(name) => {
                    tracing::warn!(execution_id = %execution_id, name = %name, "ignoring foreign file in artefact directory");
                }
                Err(raw) => {
                    tracing::warn!(execution_id = %execution_id, name = ?raw, "ignoring non-UTF-8 file in artefact directory");
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn discard(&self, execution_id: &ExecutionId) -> Result<(), StoreError> {
        let dir = self.execution_dir(execution_id);
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&dir, e)),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// In-memory artefact store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryArtefactStore {
    executions: RwLock<BTreeMap<ExecutionId, BTreeMap<String, Vec<u8>>>>,
}

impl MemoryArtefactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtefactStore for MemoryArtefactStore {
    fn create_execution(&self, execution_id: &ExecutionId) -> Result<(), StoreError> {
        let mut executions = self.executions.write();
        if executions.contains_key(execution_id) {
            return Err(StoreError::ExecutionExists(*execution_id));
        }
        executions.insert(*execution_id, BTreeMap::new());
        Ok(())
    }

    fn write(
        &self,
        execution_id: &ExecutionId,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), StoreError> {
        validate_artefact_name(name)?;
        let mut executions = self.executions.write();
        let files = executions
            .get_mut(execution_id)
            .ok_or(StoreError::ExecutionNotFound(*execution_id))?;
        if files.contains_key(name) {
            return Err(StoreError::ArtefactExists {
                execution_id: *execution_id,
                name: name.to_string(),
            });
        }
        files.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, execution_id: &ExecutionId, name: &str) -> Result<Vec<u8>, StoreError> {
        let executions = self.executions.read();
        let files = executions
            .get(execution_id)
            .ok_or(StoreError::ExecutionNotFound(*execution_id))?;
        files
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::ArtefactNotFound {
                execution_id: *execution_id,
                name: name.to_string(),
            })
    }

    fn list(&self, execution_id: &ExecutionId) -> Result<Vec<String>, StoreError> {
        let executions = self.executions.read();
        let files = executions
            .get(execution_id)
            .ok_or(StoreError::ExecutionNotFound(*execution_id))?;
        Ok(files.keys().cloned().collect())
    }

    fn discard(&self, execution_id: &ExecutionId) -> Result<(), StoreError> {
        self.executions.write().remove(execution_id);
        Ok(())
    }
}
