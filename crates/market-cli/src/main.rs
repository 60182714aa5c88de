//! # market CLI entry point
//!
//! Parses command-line arguments, loads the workflow policy, and dispatches
//! to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use market_cli::config::{run_config, ConfigArgs};
use market_cli::lifecycle::{run_check, run_next, run_table, CheckArgs, NextArgs, TableArgs};
use market_orders::LifecycleConfig;

/// Service marketplace order lifecycle tool.
///
/// Inspects the order status table and checks individual transitions
/// against payment, escrow, and delivery proof.
#[derive(Parser, Debug)]
#[command(name = "market", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML workflow config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the statuses reachable from a status.
    Next(NextArgs),

    /// Check whether a transition is allowed. Exits 2 when rejected.
    Check(CheckArgs),

    /// Print the full transition table.
    Table(TableArgs),

    /// Print the effective workflow config.
    Config(ConfigArgs),
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
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = match LifecycleConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(auto_complete_days = config.auto_complete_days, "loaded config");

    let result = match cli.command {
        Commands::Next(args) => run_next(&args),
        Commands::Check(args) => run_check(&args, &config),
        Commands::Table(args) => run_table(&args),
        Commands::Config(args) => run_config(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
