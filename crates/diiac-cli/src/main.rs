//! # diiac CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use diiac_cli::execute::{run_execute, ExecuteArgs};
use diiac_cli::intent::{run_intent, IntentArgs};
use diiac_cli::ledger::{run_ledger, LedgerArgs};
use diiac_cli::pack::{run_pack, PackArgs};
use diiac_cli::tiers::{run_tiers, TiersArgs};

/// DIIaC — governed decision execution with a hash-chained audit ledger.
#[derive(Parser, Debug)]
#[command(name = "diiac", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Human-intent capture.
    Intent(IntentArgs),

    /// Run one governed execution to a sealed ledger record.
    Execute(ExecuteArgs),

    /// Ledger verification and trust state.
    Ledger(LedgerArgs),

    /// Decision-pack manifest and rehash.
    Pack(PackArgs),

    /// Show required sections per reasoning and policy level.
    Tiers(TiersArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Intent(args) => run_intent(args, config),
        Commands::Execute(args) => run_execute(args, config),
        Commands::Ledger(args) => run_ledger(args, config),
        Commands::Pack(args) => run_pack(args, config),
        Commands::Tiers(args) => run_tiers(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use diiac_cli::ledger::LedgerCommand;
    use diiac_cli::pack::PackCommand;
    use diiac_core::{PolicyLevel, ReasoningLevel};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn execute_defaults_to_r2_p1() {
        let cli = Cli::try_parse_from(["diiac", "execute", "--provider", "ChatGPT"]).unwrap();
        if let Commands::Execute(args) = cli.command {
            assert_eq!(args.provider, "ChatGPT");
            assert_eq!(args.reasoning, ReasoningLevel::R2);
            assert_eq!(args.policy, PolicyLevel::P1);
        } else {
            panic!("expected execute");
        }
    }

    #[test]
    fn execute_parses_levels() {
        let cli = Cli::try_parse_from([
            "diiac",
            "execute",
            "--provider",
            "Copilot",
            "--reasoning",
            "R5",
            "--policy",
            "P4",
        ])
        .unwrap();
        if let Commands::Execute(args) = cli.command {
            assert_eq!(args.reasoning, ReasoningLevel::R5);
            assert_eq!(args.policy, PolicyLevel::P4);
        } else {
            panic!("expected execute");
        }
    }

    #[test]
    fn unknown_level_rejected_at_parse() {
        assert!(Cli::try_parse_from(["diiac", "execute", "--provider", "x", "--policy", "P7"]).is_err());
        assert!(Cli::try_parse_from(["diiac", "tiers", "--reasoning", "r3"]).is_err());
    }

    #[test]
    fn execute_requires_provider() {
        assert!(Cli::try_parse_from(["diiac", "execute"]).is_err());
    }

    #[test]
    fn ledger_subcommands() {
        let cli = Cli::try_parse_from(["diiac", "ledger", "verify"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Ledger(LedgerArgs {
                command: LedgerCommand::Verify
            })
        ));
        let cli = Cli::try_parse_from(["diiac", "ledger", "trust"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Ledger(LedgerArgs {
                command: LedgerCommand::Trust
            })
        ));
    }

    #[test]
    fn pack_rehash_takes_execution_id() {
        let cli = Cli::try_parse_from(["diiac", "pack", "rehash", "abc"]).unwrap();
        if let Commands::Pack(PackArgs {
            command: PackCommand::Rehash { execution_id },
        }) = cli.command
        {
            assert_eq!(execution_id, "abc");
        } else {
            panic!("expected pack rehash");
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["diiac", "ledger", "trust", "-vv", "--config", "diiac.yaml"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("diiac.yaml")));
    }
}
