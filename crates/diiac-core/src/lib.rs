//! # diiac-core — Foundational Types for the Governance Trust Layer
//!
//! Every other crate in the workspace depends on `diiac-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Structured values are hashed only after
//!    RFC 8785 (JCS) canonicalization, so key order and whitespace never
//!    change a digest.
//!
//! 2. **`ContentDigest` is a 32-byte value.** It serializes as 64 lowercase
//!    hex characters and is the only representation of a hash in the system.
//!
//! 3. **One tier table.** [`TierPolicy`] is the single source of the
//!    reasoning/policy section requirements. Prompt construction and
//!    section enforcement both read from it.
//!
//! 4. **UTC-only timestamps** with seconds precision and a `Z` suffix.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `diiac-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;
pub mod tier;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_bytes, sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{ExecutionId, ProviderId};
pub use temporal::Timestamp;
pub use tier::{PolicyLevel, ReasoningLevel, TierPolicy, TierRequirement};
