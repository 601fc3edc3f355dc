//! # Ledger CLI — Verify the hash chain.
//!
//! `verify` prints the full walk and exits `2` on a fault; `trust` prints
//! the same summary the `/trust` route returns.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::{open_orchestrator, print_json, EXIT_VERIFICATION_FAILED};

#[derive(Args, Debug)]
pub struct LedgerArgs {
    #[command(subcommand)]
    pub command: LedgerCommand,
}

#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    /// Walk every record and report the first fault, if any.
    Verify,
    /// Print chain health: validity, record count, root, frozen flag.
    Trust,
}

pub fn run_ledger(args: &LedgerArgs, config: Option<&Path>) -> Result<u8> {
    let orchestrator = open_orchestrator(config)?;
    match &args.command {
        LedgerCommand::Verify => {
            let report = orchestrator.ledger().verify()?;
            print_json(&report)?;
            if report.valid {
                Ok(0)
            } else {
                tracing::warn!(verified = report.verified, "ledger verification failed");
                Ok(EXIT_VERIFICATION_FAILED)
            }
        }
        LedgerCommand::Trust => {
            let state = orchestrator.trust_state()?;
            print_json(&state)?;
            Ok(if state.valid { 0 } else { EXIT_VERIFICATION_FAILED })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace_config(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("diiac.yaml");
        std::fs::write(&path, format!("workspace_root: {}\n", dir.display())).unwrap();
        path
    }

    #[test]
    fn verify_empty_workspace_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace_config(dir.path());
        let args = LedgerArgs {
            command: LedgerCommand::Verify,
        };
        assert_eq!(run_ledger(&args, Some(&config)).unwrap(), 0);
    }

    #[test]
    fn tampered_ledger_exits_with_verification_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace_config(dir.path());
        let orchestrator = open_orchestrator(Some(&config)).unwrap();
        orchestrator
            .capture_intent(&serde_json::json!({ "goal": "audit" }))
            .unwrap();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime
            .block_on(orchestrator.execute(diiac_governance::ExecutionRequest {
                provider: diiac_core::ProviderId::new("ChatGPT").unwrap(),
                reasoning_level: Default::default(),
                policy_level: Default::default(),
            }))
            .unwrap();

        let ledger_path = dir.path().join("ledger").join("ledger.jsonl");
        let text = std::fs::read_to_string(&ledger_path).unwrap();
        std::fs::write(&ledger_path, text.replace("ChatGPT", "Mallory")).unwrap();

        let args = LedgerArgs {
            command: LedgerCommand::Verify,
        };
        assert_eq!(
            run_ledger(&args, Some(&config)).unwrap(),
            EXIT_VERIFICATION_FAILED
        );
    }
}
