//! Command line simulator for tactical combats.
//!
//! Loads content from a data directory, hosts the combat in a session and
//! prints deltas as JSON lines on stdout. Logs go to stderr, filtered by
//! `RUST_LOG`.

mod commands;
mod report;
mod script;

use anyhow::Result;
use clap::Parser;
use commands::{Inspect, Run, Validate};

/// Tactical combat simulator
#[derive(Parser)]
#[command(name = "combat-sim")]
#[command(about = "Run and inspect scripted tactical combats", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run an encounter, optionally applying a script
    Run(Run),

    /// Summarize stored snapshots
    Inspect(Inspect),

    /// Load a content directory and assemble every encounter
    Validate(Validate),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (COMBAT_* session settings, RUST_LOG)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(cmd) => cmd.execute().await,
        Command::Inspect(cmd) => cmd.execute(),
        Command::Validate(cmd) => cmd.execute(),
    }
}
