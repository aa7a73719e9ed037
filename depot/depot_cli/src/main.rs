use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{execute_run, execute_simulate, RunArgs, SimulateArgs};

/// Depot connection pool driver
///
/// Runs queries against a fixed-size connection pool, either interactively
/// or as a concurrent load simulation.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Path to a TOML settings file
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read queries from stdin and run each one on a pooled connection
    Run(RunArgs),

    /// Release many workers against the pool at once and report the outcome
    Simulate(SimulateArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => execute_run(&args, settings),
        Commands::Simulate(args) => execute_simulate(&args, settings),
    }
}
