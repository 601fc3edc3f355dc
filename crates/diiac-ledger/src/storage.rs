//! # Ledger Persistence
//!
//! [`LedgerStorage`] is the append-only log underneath a [`crate::Ledger`]:
//! read everything in order, append one record. Implementations do not
//! check chain integrity; that is the ledger's job.
//!
//! [`JsonlLedgerStorage`] writes one JSON object per line and syncs after
//! every append. A line that fails to decode, or a file whose last line has
//! no terminating newline, is reported as [`LedgerError::CorruptRecord`].
//! [`LedgerStorage::last`] reads backwards from the end of the file, so
//! sealing a record costs one line of parsing however long the ledger is.

use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::LedgerError;
use crate::record::LedgerRecord;

/// Ordered, append-only record log.
pub trait LedgerStorage: Send {
    /// All records in append order.
    fn read_all(&self) -> Result<Vec<LedgerRecord>, LedgerError>;

    /// Durably append one record.
    fn append(&mut self, record: &LedgerRecord) -> Result<(), LedgerError>;

    /// The last record, if any.
    fn last(&self) -> Result<Option<LedgerRecord>, LedgerError> {
        Ok(self.read_all()?.pop())
    }
}

// ---------------------------------------------------------------------------
// JSONL file
// ---------------------------------------------------------------------------

/// JSON-lines file storage.
#[derive(Debug, Clone)]
pub struct JsonlLedgerStorage {
    path: PathBuf,
}

impl JsonlLedgerStorage {
    /// Use `path` as the ledger file. It is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_lines(content: &str) -> Result<Vec<LedgerRecord>, LedgerError> {
    if content.is_empty() {
        return Ok(Vec::new());
    }
    let Some(body) = content.strip_suffix('\n') else {
        let line = content.lines().count();
        return Err(LedgerError::CorruptRecord {
            line,
            reason: "truncated record (missing trailing newline)".to_string(),
        });
    };
    body.split('\n')
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| LedgerError::CorruptRecord {
                line: i + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}

const TAIL_CHUNK: u64 = 4096;

impl JsonlLedgerStorage {
    /// Bytes from the start of the final line to the end of the file.
    fn read_tail_line(&self) -> Result<Option<Vec<u8>>, LedgerError> {
        let io_err = |e| LedgerError::io(&self.path, e);
        let mut file = match fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(e)),
        };
        let mut pos = file.metadata().map_err(io_err)?.len();
        if pos == 0 {
            return Ok(None);
        }
        let mut tail = Vec::new();
        loop {
            let step = pos.min(TAIL_CHUNK);
            pos -= step;
            let mut chunk = vec![0u8; step as usize];
            file.seek(SeekFrom::Start(pos)).map_err(io_err)?;
            file.read_exact(&mut chunk).map_err(io_err)?;
            chunk.extend_from_slice(&tail);
            tail = chunk;
            // The last byte is the final record's terminator.
            if let Some(i) = tail[..tail.len() - 1].iter().rposition(|&b| b == b'\n') {
                return Ok(Some(tail.split_off(i + 1)));
            }
            if pos == 0 {
                return Ok(Some(tail));
            }
        }
    }
}

impl LedgerStorage for JsonlLedgerStorage {
    fn read_all(&self) -> Result<Vec<LedgerRecord>, LedgerError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Err(LedgerError::CorruptRecord {
                    line: 0,
                    reason: "ledger file is not valid UTF-8".to_string(),
                });
            }
            Err(e) => return Err(LedgerError::io(&self.path, e)),
        };
        parse_lines(&content)
    }

    fn append(&mut self, record: &LedgerRecord) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| LedgerError::io(parent, e))?;
            }
        }
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LedgerError::io(&self.path, e))?;
        file.write_all(&line)
            .map_err(|e| LedgerError::io(&self.path, e))?;
        file.sync_data()
            .map_err(|e| LedgerError::io(&self.path, e))?;
        Ok(())
    }

    /// Anything but a complete, decodable final line falls back to
    /// [`Self::read_all`], which reports the fault with its line number.
    fn last(&self) -> Result<Option<LedgerRecord>, LedgerError> {
        let Some(tail) = self.read_tail_line()? else {
            return Ok(None);
        };
        let decoded = tail
            .strip_suffix(b"\n")
            .and_then(|line| serde_json::from_slice(line).ok());
        match decoded {
            Some(record) => Ok(Some(record)),
            None => self.read_all().map(|mut records| records.pop()),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// In-memory storage for tests and ephemeral runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStorage {
    records: Vec<LedgerRecord>,
}

impl MemoryLedgerStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing record sequence, sealed or not.
    pub fn from_records(records: Vec<LedgerRecord>) -> Self {
        Self { records }
    }
}

impl LedgerStorage for MemoryLedgerStorage {
    fn read_all(&self) -> Result<Vec<LedgerRecord>, LedgerError> {
        Ok(self.records.clone())
    }

    fn append(&mut self, record: &LedgerRecord) -> Result<(), LedgerError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn last(&self) -> Result<Option<LedgerRecord>, LedgerError> {
        Ok(self.records.last().cloned())
    }
}
