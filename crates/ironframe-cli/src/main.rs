//! # ironframe CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ironframe_cli::cadence::{run_cadence, CadenceArgs};
use ironframe_cli::score::{
    run_classify, run_score_entity, run_vendor_health, ClassifyArgs, ScoreEntityArgs,
    VendorHealthArgs,
};

/// Ironframe CLI
///
/// Deterministic risk classification, entity and vendor health scoring,
/// and vendor compliance cadence evaluation from JSON or YAML files.
#[derive(Parser, Debug)]
#[command(name = "ironframe", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the cadence configuration file (YAML or JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify an exposure against a threshold.
    Classify(ClassifyArgs),

    /// Score an entity's security posture.
    ScoreEntity(ScoreEntityArgs),

    /// Score a vendor's health.
    VendorHealth(VendorHealthArgs),

    /// Vendor compliance cadence (evaluate, ack, unresponsive, verify-audit).
    Cadence(CadenceArgs),
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

    tracing::debug!("ironframe CLI starting");

    let result = match &cli.command {
        Commands::Classify(args) => run_classify(args),
        Commands::ScoreEntity(args) => run_score_entity(args),
        Commands::VendorHealth(args) => run_vendor_health(args),
        Commands::Cadence(args) => run_cadence(args, cli.config.as_deref()),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
