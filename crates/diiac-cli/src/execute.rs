//! # Execute CLI — Run one governed execution.
//!
//! ```bash
//! diiac execute --provider ChatGPT
//! diiac execute --provider Copilot --reasoning R5 --policy P4
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use diiac_core::{PolicyLevel, ProviderId, ReasoningLevel};
use diiac_governance::ExecutionRequest;

use crate::{open_orchestrator, print_json};

#[derive(Args, Debug)]
pub struct ExecuteArgs {
    /// Provider name recorded in the decision pack.
    #[arg(long)]
    pub provider: String,

    /// Reasoning level, R0 through R5.
    #[arg(long, default_value = "R2")]
    pub reasoning: ReasoningLevel,

    /// Policy level, P0 through P5.
    #[arg(long, default_value = "P1")]
    pub policy: PolicyLevel,
}

pub fn run_execute(args: &ExecuteArgs, config: Option<&Path>) -> Result<u8> {
    let request = ExecutionRequest {
        provider: ProviderId::new(args.provider.as_str())?,
        reasoning_level: args.reasoning,
        policy_level: args.policy,
    };
    let orchestrator = open_orchestrator(config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let outcome = runtime.block_on(orchestrator.execute(request))?;

    print_json(&outcome)?;
    if !outcome.enforced_sections.is_empty() {
        eprintln!(
            "placeholders inserted for: {}",
            outcome.enforced_sections.join(", ")
        );
    }
    Ok(0)
}
