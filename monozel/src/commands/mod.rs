//! Monozel command-line interface
//!
//! - `build`: Build every project that changed since the last successful run
//! - `plan`: Show what a build would do
//! - `clean`: Forget the last successful run

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod build;
pub mod clean;
pub mod plan;

/// Monozel - incremental build runner for Python/Node monorepos
#[derive(Parser)]
#[command(name = "monozel")]
#[command(about = "Incremental build runner for Python/Node monorepos")]
#[command(version)]
pub struct Cli {
    /// Path to the builder configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "MONOZEL_CONFIG",
        default_value = "monorepo-builder-config.json"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build changed projects: libraries first, then standard projects
    Build {
        /// Version label recorded for every rebuilt project
        #[arg(long, env = "MONOREPO_BUILD_VERSION", default_value = "1.0.0")]
        version: String,

        /// Concurrent builds per phase (0 = number of CPUs)
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,
    },

    /// Show which projects would be built, without building anything
    Plan,

    /// Delete the saved project list and versions (next build rebuilds everything)
    Clean,
}
