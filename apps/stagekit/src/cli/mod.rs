//! # stagekit CLI Module
//!
//! This module implements the CLI interface for stagekit.
//!
//! ## Available Commands
//!
//! - `resolve` - Resolve branch and stage from the environment (default)
//! - `derive` - Classify a given branch
//! - `sanitize` - Sanitize raw text into a stage identifier
//! - `context` - Show stack id, tags, function env and target
//! - `env` - Print shell `export` lines for STAGE/BRANCH

mod commands;

use crate::config::Settings;
use clap::{Parser, Subcommand};
use stagekit_core::StageError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// stagekit - deployment stage resolver
///
/// Derives a bounded stage name from CI branch variables or git, and the
/// stack id, tags and function environment a provisioning run consumes.
#[derive(Parser, Debug)]
#[command(name = "stagekit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Path to a stagekit.toml config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory to run the git fallback query in
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub repo: PathBuf,

    /// Timeout for the git fallback query, in milliseconds
    #[arg(long, global = true)]
    pub git_timeout_ms: Option<u64>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve branch and stage from CI variables or git
    Resolve {
        /// Print only the stage
        #[arg(short, long)]
        short: bool,
    },

    /// Derive the stage for a given branch name
    Derive {
        /// Branch name to classify
        branch: String,
    },

    /// Sanitize raw text into a stage identifier
    Sanitize {
        /// Text to sanitize (lowercased first)
        raw: String,
    },

    /// Show the deployment context (stack id, tags, function env, target)
    Context {
        /// Table name exposed to the function as TABLE
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Print `export` lines for STAGE and BRANCH
    Env {
        /// Table name exported as TABLE
        #[arg(short, long)]
        table: Option<String>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Options shared by every command after config and flags are merged.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub settings: Settings,
    pub repo: PathBuf,
    pub json_mode: bool,
}

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), StageError> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(timeout) = cli.git_timeout_ms {
        if timeout == 0 {
            return Err(StageError::Config(
                "--git-timeout-ms must be positive".to_string(),
            ));
        }
        settings.git_timeout_ms = timeout;
    }

    let opts = RunOptions {
        settings,
        repo: cli.repo,
        json_mode: cli.json_mode,
    };

    let mut out = std::io::stdout().lock();

    match cli.command {
        Some(Commands::Resolve { short }) => cmd_resolve(&mut out, &opts, short),
        Some(Commands::Derive { branch }) => cmd_derive(&mut out, &opts, &branch),
        Some(Commands::Sanitize { raw }) => cmd_sanitize(&mut out, &opts, &raw),
        Some(Commands::Context { table }) => cmd_context(&mut out, &opts, table),
        Some(Commands::Env { table }) => cmd_env(&mut out, &opts, table),
        None => {
            // No subcommand - resolve by default
            cmd_resolve(&mut out, &opts, false)
        }
    }
}
