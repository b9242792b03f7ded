//! Monozel - incremental build runner for Python/Node monorepos
//!
//! Orchestrates:
//! 1. Configuration loading
//! 2. Project discovery and fingerprinting
//! 3. Change detection against the last successful run
//! 4. Library builds, then standard project builds
//! 5. Snapshot persistence on success

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "monozel=info,convenient_monorepo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = convenient_monorepo::Configuration::load(&cli.config)?;

    let success = match cli.command {
        Commands::Build { version, jobs } => commands::build::execute(&config, &version, jobs)?,
        Commands::Plan => commands::plan::execute(&config)?,
        Commands::Clean => commands::clean::execute(&config)?,
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
