//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! Results go to the writer handed in by `execute` (stdout); logging goes
//! to stderr.

use super::RunOptions;
use crate::git::GitLookup;
use serde::Serialize;
use std::io::{self, Write};
use stagekit_core::{
    ACCOUNT_SIGNALS, DeployTarget, DeploymentContext, REGION_SIGNALS, Resolution, StageError,
    collect_signals, derive, sanitize_stage,
};

// =============================================================================
// PROCESS INPUTS
// =============================================================================

/// Read one environment variable; unset and non-UTF-8 values count as absent.
fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolve branch and stage from the process environment and git.
pub fn resolve_from_process(opts: &RunOptions) -> Resolution {
    let resolver = opts.settings.resolver();
    let signals = resolver.collect(read_env);
    let lookup = GitLookup::new(opts.repo.clone(), opts.settings.git_timeout_ms);
    resolver.resolve(&signals, &lookup)
}

/// Target account/region from the process environment.
pub fn target_from_process() -> DeployTarget {
    DeployTarget::from_signals(
        &collect_signals(&ACCOUNT_SIGNALS, read_env),
        &collect_signals(&REGION_SIGNALS, read_env),
    )
}

/// Build the deployment context for this process.
pub fn context_from_process(opts: &RunOptions, table: Option<String>) -> DeploymentContext {
    let resolution = resolve_from_process(opts);
    DeploymentContext::new(
        &resolution,
        &opts.settings.context_settings(table),
        target_from_process(),
    )
}

/// Run `write` against `out` and flush.
///
/// A closed reader (EPIPE, e.g. `| head -0`) ends output quietly; any other
/// write failure becomes [`StageError::Io`].
fn emit<W, F>(out: &mut W, write: F) -> Result<(), StageError>
where
    W: Write,
    F: FnOnce(&mut W) -> io::Result<()>,
{
    match write(out).and_then(|()| out.flush()) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("output closed by reader");
            Ok(())
        }
        Err(e) => Err(StageError::Io(format!("Cannot write output: {}", e))),
    }
}

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), StageError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| StageError::Serialization(e.to_string()))?;
    emit(out, |w| writeln!(w, "{}", text))
}

// =============================================================================
// RESOLVE COMMAND
// =============================================================================

/// Resolve and print branch, source and stage.
pub fn cmd_resolve<W: Write>(
    out: &mut W,
    opts: &RunOptions,
    short: bool,
) -> Result<(), StageError> {
    let resolution = resolve_from_process(opts);

    if opts.json_mode {
        return print_json(out, &resolution);
    }

    if short {
        return emit(out, |w| writeln!(w, "{}", resolution.stage));
    }

    emit(out, |w| {
        writeln!(w, "Branch: {}", resolution.branch)?;
        writeln!(w, "Source: {}", resolution.source)?;
        writeln!(w, "Stage:  {}", resolution.stage)?;
        writeln!(w, "Rule:   {}", resolution.rule.unwrap_or("sanitized"))
    })
}

// =============================================================================
// DERIVE COMMAND
// =============================================================================

/// Classify a branch given on the command line.
pub fn cmd_derive<W: Write>(
    out: &mut W,
    opts: &RunOptions,
    branch: &str,
) -> Result<(), StageError> {
    let derivation = derive(branch);

    if opts.json_mode {
        return print_json(out, &serde_json::json!({
            "branch": branch,
            "stage": derivation.stage,
            "rule": derivation.rule.map(|r| r.name),
        }));
    }

    emit(out, |w| writeln!(w, "{}", derivation.stage))
}

// =============================================================================
// SANITIZE COMMAND
// =============================================================================

/// Sanitize raw text, lowercasing it first.
pub fn cmd_sanitize<W: Write>(
    out: &mut W,
    opts: &RunOptions,
    raw: &str,
) -> Result<(), StageError> {
    let stage = sanitize_stage(&raw.to_lowercase());

    if opts.json_mode {
        return print_json(out, &serde_json::json!({ "input": raw, "stage": stage }));
    }

    emit(out, |w| writeln!(w, "{}", stage))
}

// =============================================================================
// CONTEXT COMMAND
// =============================================================================

/// Show everything the provisioning step consumes.
pub fn cmd_context<W: Write>(
    out: &mut W,
    opts: &RunOptions,
    table: Option<String>,
) -> Result<(), StageError> {
    let ctx = context_from_process(opts, table);

    if opts.json_mode {
        return print_json(out, &ctx);
    }

    emit(out, |w| {
        writeln!(w, "Deployment Context")?;
        writeln!(w, "==================")?;
        writeln!(w, "Stack:   {}", ctx.stack_id)?;
        writeln!(w, "Stage:   {}", ctx.stage)?;
        writeln!(w, "Branch:  {}", ctx.branch)?;
        writeln!(w, "Account: {}", ctx.target.account.as_deref().unwrap_or("(default)"))?;
        writeln!(w, "Region:  {}", ctx.target.region.as_deref().unwrap_or("(default)"))?;
        writeln!(w)?;
        writeln!(w, "Tags:")?;
        for (key, value) in &ctx.tags {
            writeln!(w, "  {} = {}", key, value)?;
        }
        writeln!(w)?;
        writeln!(w, "Function Environment:")?;
        for (key, value) in &ctx.function_env {
            writeln!(w, "  {}={}", key, value)?;
        }
        Ok(())
    })
}

// =============================================================================
// ENV COMMAND
// =============================================================================

/// Print `export` lines suitable for `eval` in CI scripts.
pub fn cmd_env<W: Write>(
    out: &mut W,
    opts: &RunOptions,
    table: Option<String>,
) -> Result<(), StageError> {
    let ctx = context_from_process(opts, table);

    if opts.json_mode {
        return print_json(out, &ctx.function_env);
    }

    emit(out, |w| {
        for (key, value) in &ctx.function_env {
            writeln!(w, "export {}={}", key, shell_quote(value))?;
        }
        Ok(())
    })
}

/// Single-quote a value for POSIX shells.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
