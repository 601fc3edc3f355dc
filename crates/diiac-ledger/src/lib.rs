//! # diiac-ledger — Hash-Chained Execution Ledger
//!
//! An append-only sequence of [`LedgerRecord`]s. Each record commits to its
//! predecessor through `previous_hash`, and to its own content through
//! `record_hash`:
//!
//! ```text
//! record_hash = SHA256(JCS(record without record_hash))
//! ```
//!
//! The first record links to the `"GENESIS"` sentinel.
//!
//! ## Concurrency
//!
//! A [`Ledger`] owns its storage behind a mutex held across the whole
//! read-tail / compute / persist sequence, so two appends can never observe
//! the same tail. There is no process-wide state; two `Ledger` values over
//! the same file are not coordinated with each other.
//!
//! ## Integrity Failures
//!
//! Verification never repairs anything. When a fault is found (or the tail
//! record fails its own hash check at append time) the ledger freezes and
//! refuses further appends.

pub mod error;
pub mod ledger;
pub mod record;
pub mod storage;

pub use error::LedgerError;
pub use ledger::{verify_chain, ChainFault, ChainVerification, FaultKind, Ledger};
pub use record::{ChainLink, ExecutionRecord, LedgerRecord, RecordType, GENESIS_SENTINEL};
pub use storage::{JsonlLedgerStorage, LedgerStorage, MemoryLedgerStorage};
