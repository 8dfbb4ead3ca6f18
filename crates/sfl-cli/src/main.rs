//! # sfl CLI entry point
//!
//! Parses arguments, sets up logging and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sfl_cli::conflict::{run_conflict, ConflictArgs};
use sfl_cli::context::{Context, GlobalArgs};
use sfl_cli::contract::{run_contract, ContractArgs};
use sfl_cli::seed::{run_seed, SeedArgs};

/// Contract lifecycle client.
///
/// Drafts, signs and completes freelance contracts and reports conflicts
/// against a Contract Store gateway.
#[derive(Parser, Debug)]
#[command(name = "sfl", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Contract lifecycle actions.
    Contract(ContractArgs),

    /// Conflict reporting and review.
    Conflict(ConflictArgs),

    /// Create sample users and a draft contract.
    Seed(SeedArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
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

    let ctx = match Context::connect(&cli.global) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(actor = %ctx.actor, "sfl starting");

    let result = match &cli.command {
        Commands::Contract(args) => run_contract(args, &ctx).await,
        Commands::Conflict(args) => run_conflict(args, &ctx).await,
        Commands::Seed(args) => run_seed(args, &ctx).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
