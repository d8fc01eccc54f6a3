//! # stagekit
//!
//! Resolves the deployment stage for a provisioning run.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                 apps/stagekit (THE BINARY)                │
//! │                                                           │
//! │  ┌─────────────┐   ┌──────────────┐   ┌───────────────┐   │
//! │  │   CLI       │   │  env vars    │   │  git fallback │   │
//! │  │  (clap)     │   │  + toml cfg  │   │ (wait-timeout)│   │
//! │  └──────┬──────┘   └──────┬───────┘   └───────┬───────┘   │
//! │         └─────────────────┼───────────────────┘           │
//! │                           ▼                               │
//! │                  ┌─────────────────┐                      │
//! │                  │  stagekit-core  │                      │
//! │                  │  (THE LOGIC)    │                      │
//! │                  └─────────────────┘                      │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! stagekit                      # branch, source, stage
//! stagekit resolve --short      # just the stage
//! stagekit derive hotfix/db     # classify a branch
//! stagekit --json-mode context  # stack id, tags, function env
//! eval "$(stagekit env)"        # export STAGE and BRANCH
//! ```

use clap::Parser;
use stagekit::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the tracing subscriber on stderr.
///
/// STAGEKIT_LOG_FORMAT=json enables machine-parseable output; RUST_LOG
/// overrides the default filter.
fn init_tracing(verbose: bool) {
    let log_format = std::env::var("STAGEKIT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if verbose {
        "stagekit=debug,stagekit_core=debug"
    } else {
        "stagekit=info,stagekit_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
