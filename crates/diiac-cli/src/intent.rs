//! # Intent CLI — Capture human-intent documents.
//!
//! ```bash
//! diiac intent capture intent.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::open_orchestrator;

#[derive(Args, Debug)]
pub struct IntentArgs {
    #[command(subcommand)]
    pub command: IntentCommand,
}

#[derive(Subcommand, Debug)]
pub enum IntentCommand {
    /// Store a JSON document as the latest human intent.
    Capture {
        /// Path to the JSON document.
        file: PathBuf,
    },
}

pub fn run_intent(args: &IntentArgs, config: Option<&Path>) -> Result<u8> {
    match &args.command {
        IntentCommand::Capture { file } => run_capture(file, config),
    }
}

fn run_capture(file: &Path, config: Option<&Path>) -> Result<u8> {
    let raw = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let document: serde_json::Value = serde_json::from_slice(&raw)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let saved = open_orchestrator(config)?.capture_intent(&document)?;
    println!("saved: {saved}");
    Ok(0)
}
