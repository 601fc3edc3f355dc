//! # diiac-governance — Governed Execution Orchestrator
//!
//! Composes the trust layer around one external generation call:
//!
//! 1. Load the latest captured human intent ([`intent`]).
//! 2. Ask a [`ContentGenerator`] for a section-keyed report, guided by the
//!    tier's required sections.
//! 3. Enforce the tier on the result (`diiac-pack`).
//! 4. Write artefacts, build the manifest, and seal the final pack hash into
//!    the ledger (`diiac-ledger`).
//!
//! The ledger append is the commit point. A failed or cancelled execution
//! leaves no ledger record and no artefact directory.
//!
//! ## Configuration
//!
//! [`GovernanceConfig`] resolves defaults, an optional YAML file, and
//! environment variables. [`Orchestrator::from_config`] wires the
//! filesystem-backed stores from it.

pub mod config;
pub mod error;
pub mod generator;
pub mod impact;
pub mod intent;
pub mod orchestrator;

pub use config::{ConfigError, GovernanceConfig};
pub use error::{ErrorKind, GovernanceError};
pub use generator::{
    BoxFuture, ContentGenerator, DisabledGenerator, GenerationError, GenerationRequest,
    OpenAiGenerator,
};
pub use impact::{assess_policy_impact, PolicyImpact, Severity};
pub use intent::{FsIntentStore, IntentDocument, IntentError, IntentStore, MemoryIntentStore};
pub use orchestrator::{
    ExecutionOutcome, ExecutionRequest, ExecutionStage, Orchestrator, RehashReport, TrustState,
};
