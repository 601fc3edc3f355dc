//! # Pack CLI — Inspect and re-derive decision packs.
//!
//! `rehash` recomputes the final pack hash from the stored artefacts and
//! compares it with the value sealed in the ledger. A mismatch exits `2`.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};
use diiac_core::ExecutionId;

use crate::{open_orchestrator, print_json, EXIT_VERIFICATION_FAILED};

#[derive(Args, Debug)]
pub struct PackArgs {
    #[command(subcommand)]
    pub command: PackCommand,
}

#[derive(Subcommand, Debug)]
pub enum PackCommand {
    /// Print an execution's artefact manifest.
    Manifest {
        /// Execution UUID.
        execution_id: String,
    },
    /// Recompute an execution's pack hash and compare with the ledger.
    Rehash {
        /// Execution UUID.
        execution_id: String,
    },
}

pub fn run_pack(args: &PackArgs, config: Option<&Path>) -> Result<u8> {
    match &args.command {
        PackCommand::Manifest { execution_id } => {
            let id = ExecutionId::parse(execution_id)?;
            print_json(&open_orchestrator(config)?.manifest(&id)?)?;
            Ok(0)
        }
        PackCommand::Rehash { execution_id } => {
            let id = ExecutionId::parse(execution_id)?;
            let report = open_orchestrator(config)?.rehash(&id)?;
            print_json(&report)?;
            Ok(if report.matches_ledger {
                0
            } else {
                EXIT_VERIFICATION_FAILED
            })
        }
    }
}
