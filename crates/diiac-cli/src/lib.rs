//! # diiac-cli — Command-Line Access to the Governance Trust Layer
//!
//! Runs the same operations as the HTTP surface against a local workspace,
//! without a server.
//!
//! ## Subcommands
//!
//! - `diiac intent capture <file>` — Store a human-intent document.
//! - `diiac execute --provider <p>` — Run one governed execution.
//! - `diiac ledger verify|trust` — Walk the hash chain.
//! - `diiac pack manifest|rehash <id>` — Inspect or re-derive a decision pack.
//! - `diiac tiers` — Print the section table for a tier.
//!
//! ```bash
//! diiac intent capture intent.json
//! diiac execute --provider ChatGPT --reasoning R4 --policy P3
//! diiac ledger verify
//! ```
//!
//! Exit codes: `0` success, `1` error, `2` verification failed.

pub mod execute;
pub mod intent;
pub mod ledger;
pub mod pack;
pub mod tiers;

use std::path::Path;

use anyhow::{Context, Result};
use diiac_governance::{GovernanceConfig, Orchestrator};

/// Exit code for a completed check that found a problem.
pub const EXIT_VERIFICATION_FAILED: u8 = 2;

/// Build a filesystem-backed orchestrator from `--config` and the environment.
pub fn open_orchestrator(config_path: Option<&Path>) -> Result<Orchestrator> {
    let config = GovernanceConfig::load(config_path).context("failed to load configuration")?;
    tracing::debug!(workspace = %config.workspace_root.display(), "configuration loaded");
    Orchestrator::from_config(&config).context("failed to initialise orchestrator")
}

/// Pretty-print a serializable value to stdout.
pub fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
