//! # Gather - Asset Preloader
//!
//! The main binary for the Gather readiness coordinator.
//!
//! This application provides:
//! - CLI preloading with progress output
//! - HTTP status API (axum-based) for polling progress
//! - Manifest validation and locator classification
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      apps/gather (THE BINARY)                   │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐     │
//! │  │   CLI       │    │   HTTP API  │    │   Coordinator    │     │
//! │  │  (clap)     │    │   (axum)    │    │ (tokio + loaders)│     │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘     │
//! │         │                  │                    │               │
//! │         └──────────────────┼────────────────────┘               │
//! │                            ▼                                    │
//! │                    ┌───────────────┐                            │
//! │                    │  gather-core  │                            │
//! │                    │ (THE LOGIC)   │                            │
//! │                    └───────────────┘                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Preload everything in a manifest
//! gather preload -m site/assets.toml
//!
//! # Preload while serving status
//! gather serve -m site/assets.toml --port 8080
//!
//! # Inspect
//! gather classify intro.MP4 theme.ogg cover.png
//! gather check -m site/assets.json
//! ```

mod cli;

use clap::Parser;
use gather::config::LOG_FORMAT_ENV;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // GATHER_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "gather=debug,tower_http=debug"
    } else {
        "gather=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Gather startup banner.
fn print_banner() {
    println!(
        r#"
   ██████╗  █████╗ ████████╗██╗  ██╗███████╗██████╗
  ██╔════╝ ██╔══██╗╚══██╔══╝██║  ██║██╔════╝██╔══██╗
  ██║  ███╗███████║   ██║   ███████║█████╗  ██████╔╝
  ██║   ██║██╔══██║   ██║   ██╔══██║██╔══╝  ██╔══██╗
  ╚██████╔╝██║  ██║   ██║   ██║  ██║███████╗██║  ██║
   ╚═════╝ ╚═╝  ╚═╝   ╚═╝   ╚═╝  ╚═╝╚══════╝╚═╝  ╚═╝

  Asset Preloader v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
