//! CLI for the acache asset cache.

mod commands;

use acache_core::config::{self, AcacheConfig};
use acache_core::AssetCategory;
use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process::ExitCode;

use commands::{
    run_batch, run_check, run_checksum, run_completions, run_config, run_man, run_path,
    run_resolve,
};

/// Exit code when an asset could not be resolved from any source.
pub const EXIT_UNAVAILABLE: u8 = 2;

/// Top-level CLI for the acache asset cache.
#[derive(Debug, Parser)]
#[command(name = "acache", version)]
#[command(about = "acache: resolve theme assets to a local, freshness-checked cache", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve an asset to a local file URI, downloading it if missing or stale.
    Resolve {
        /// stickers, backgrounds or promotion.
        category: AssetCategory,
        /// Asset path relative to the category directory.
        path: String,
        /// Download even if the cached copy is fresh.
        #[arg(long)]
        force: bool,
        /// Print a JSON object instead of the bare URI.
        #[arg(long)]
        json: bool,
    },

    /// Report whether the cached copy is stale against the primary source.
    Check {
        category: AssetCategory,
        path: String,
    },

    /// Show where an asset lives locally and remotely. No network access.
    Path {
        category: AssetCategory,
        path: String,
    },

    /// Resolve many assets of one category concurrently.
    Batch {
        category: AssetCategory,
        /// Asset paths relative to the category directory.
        #[arg(required = true)]
        paths: Vec<String>,
        /// Resolve up to N assets at once.
        #[arg(long, default_value = "4", value_name = "N")]
        jobs: usize,
        /// Download even if cached copies are fresh.
        #[arg(long)]
        force: bool,
    },

    /// Compute SHA-256 of a file (e.g. to publish a .checksum.txt sidecar).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Print the config file location and the effective configuration.
    Config,

    /// Generate shell completions on stdout.
    Completions {
        shell: Shell,
    },

    /// Generate a man page on stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<ExitCode> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Resolve {
                category,
                path,
                force,
                json,
            } => return run_resolve(&load_config()?, category, path, force, json).await,
            CliCommand::Check { category, path } => {
                run_check(&load_config()?, category, path).await?
            }
            CliCommand::Path { category, path } => run_path(&load_config()?, category, &path)?,
            CliCommand::Batch {
                category,
                paths,
                jobs,
                force,
            } => return run_batch(&load_config()?, category, paths, jobs, force).await,
            CliCommand::Checksum { path } => run_checksum(&path).await?,
            CliCommand::Config => run_config(&load_config()?)?,
            CliCommand::Completions { shell } => run_completions(shell)?,
            CliCommand::Man => run_man()?,
        }

        Ok(ExitCode::SUCCESS)
    }
}

fn load_config() -> Result<AcacheConfig> {
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

#[cfg(test)]
mod tests;
