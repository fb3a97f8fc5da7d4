//! Germinal CLI - run germinal-center simulations from a TOML configuration.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "germinal")]
#[command(author, version, about = "Germinal - stochastic germinal-center decision models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default germinal.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Validate a configuration and print the resolved policies
    Check {
        /// Config file (default: germinal.toml in current or parent directories)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Seed a germinal center and run cycles
    Run {
        /// Config file (default: germinal.toml in current or parent directories)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of cycles (overrides run.cycles)
        #[arg(short = 'n', long)]
        cycles: Option<usize>,

        /// Generator seed (overrides run.seed)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print cycle reports as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Check { config } => commands::check::run(config),
        Commands::Run {
            config,
            cycles,
            seed,
            json,
        } => commands::run::run(config, cycles, seed, json, cli.verbose),
    }
}
