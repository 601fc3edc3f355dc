//! # diiac-pack — Decision Pack Assembly
//!
//! Turns a generated report into a sealed-ready decision pack:
//!
//! 1. [`report`] models the report as named sections that are either
//!    AI-authored or placeholders injected by enforcement.
//! 2. [`enforcement`] guarantees every section required by the tier pair is
//!    present.
//! 3. [`store`] writes artefact files into a per-execution directory.
//! 4. [`manifest`] hashes the artefact set into a manifest and pack hash.
//!
//! Nothing in this crate touches the ledger. Sealing is the orchestrator's
//! job, and it happens only after the manifest is on disk.

pub mod enforcement;
pub mod error;
pub mod manifest;
pub mod report;
pub mod store;
pub mod summary;

pub use enforcement::{enforce, placeholder_note};
pub use error::{PackError, StoreError};
pub use manifest::{
    compute_pack_hash, ArtefactEntry, ArtefactManifest, ManifestBuild, ManifestBuilder,
    ManifestContext, GOVERNANCE_CONTRACT_ID, MANIFEST_FILE,
};
pub use report::{GovernedReport, Section};
pub use store::{validate_artefact_name, ArtefactStore, FsArtefactStore, MemoryArtefactStore};
pub use summary::{DecisionSummary, TierEnforcement, DECISION_SUMMARY_FILE, STRATEGY_REPORT_FILE};
