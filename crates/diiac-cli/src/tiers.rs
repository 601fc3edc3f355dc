//! # Tiers CLI — Print required sections.
//!
//! With both levels given, prints the combined requirement. With one or
//! none, prints the table rows for the selected axis.

use anyhow::Result;
use clap::Args;
use diiac_core::{PolicyLevel, ReasoningLevel, TierPolicy};

#[derive(Args, Debug)]
pub struct TiersArgs {
    #[arg(long)]
    pub reasoning: Option<ReasoningLevel>,

    #[arg(long)]
    pub policy: Option<PolicyLevel>,
}

pub fn run_tiers(args: &TiersArgs) -> Result<u8> {
    match (args.reasoning, args.policy) {
        (Some(r), Some(p)) => {
            let requirement = TierPolicy::required_sections(r, p);
            println!("{} ({} sections)", requirement.label(), requirement.len());
            for section in requirement.sections() {
                println!("  {section}");
            }
        }
        (reasoning, policy) => {
            if policy.is_none() {
                let levels = reasoning.map_or(ReasoningLevel::ALL.to_vec(), |r| vec![r]);
                for r in levels {
                    println!("{r}: {}", TierPolicy::reasoning_sections(r).join(", "));
                }
            }
            if reasoning.is_none() {
                let levels = policy.map_or(PolicyLevel::ALL.to_vec(), |p| vec![p]);
                for p in levels {
                    println!("{p}: {}", TierPolicy::policy_sections(p).join(", "));
                }
            }
        }
    }
    Ok(0)
}
