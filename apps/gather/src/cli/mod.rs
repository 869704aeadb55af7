//! # Gather CLI Module
//!
//! This module implements the CLI interface for Gather.
//!
//! ## Available Commands
//!
//! - `preload` - Preload a manifest and report readiness
//! - `serve` - Preload a manifest while serving the status API
//! - `classify` - Show the inferred kind of locators
//! - `check` - Validate a manifest and list its assets

mod commands;

use clap::{Parser, Subcommand};
use gather_core::{GatherError, TimeoutOverrides};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Gather - preload media assets and signal readiness exactly once.
///
/// Every asset settles as loaded, failed or timed out; a global timeout
/// guarantees readiness even when some assets never answer.
#[derive(Parser, Debug)]
#[command(name = "gather")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Per-asset timeout in milliseconds (overrides the manifest)
    #[arg(long, global = true)]
    pub per_asset_ms: Option<u64>,

    /// Global timeout in milliseconds (overrides the manifest)
    #[arg(long, global = true)]
    pub global_ms: Option<u64>,

    /// Delay between the last settlement and readiness, in milliseconds
    #[arg(long, global = true)]
    pub grace_ms: Option<u64>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Timeout overrides given on the command line.
    #[must_use]
    pub fn timeout_overrides(&self) -> TimeoutOverrides {
        TimeoutOverrides {
            per_asset_ms: self.per_asset_ms,
            global_ms: self.global_ms,
            settle_grace_ms: self.grace_ms,
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Preload every asset in a manifest
    Preload {
        /// Path to the manifest (TOML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,
    },

    /// Preload a manifest and serve its status over HTTP
    Serve {
        /// Path to the manifest (TOML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Show the inferred kind of each locator
    Classify {
        /// Locators to classify
        #[arg(required = true)]
        locators: Vec<String>,
    },

    /// Validate a manifest and list its assets
    Check {
        /// Path to the manifest (TOML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), GatherError> {
    let overrides = cli.timeout_overrides();
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Preload { manifest } => cmd_preload(&manifest, overrides, json_mode).await,
        Commands::Serve {
            manifest,
            host,
            port,
        } => cmd_serve(&manifest, overrides, &host, port).await,
        Commands::Classify { locators } => cmd_classify(&locators, json_mode),
        Commands::Check { manifest } => cmd_check(&manifest, overrides, json_mode),
    }
}
