//! # Git Fallback Lookup
//!
//! Asks git for the checked-out branch when no CI signal is set.
//!
//! Runs `git rev-parse --abbrev-ref HEAD` with stdin closed, stdout captured
//! and stderr discarded. The child is killed once the timeout elapses.
//! Every failure (git missing, not a repository, no commits, timeout) comes
//! back as a [`StageError`] for the resolver to absorb.

use stagekit_core::{BranchLookup, StageError};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Default budget for the git query.
pub const DEFAULT_GIT_TIMEOUT_MS: u64 = 5_000;

const GIT_ARGS: [&str; 3] = ["rev-parse", "--abbrev-ref", "HEAD"];

/// Version-control lookup backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitLookup {
    repo: PathBuf,
    timeout_ms: u64,
}

impl GitLookup {
    #[must_use]
    pub fn new(repo: impl Into<PathBuf>, timeout_ms: u64) -> Self {
        Self {
            repo: repo.into(),
            timeout_ms,
        }
    }

    #[must_use]
    pub fn repo(&self) -> &Path {
        &self.repo
    }

    fn spawn(&self) -> Result<Child, StageError> {
        Command::new("git")
            .args(GIT_ARGS)
            .current_dir(&self.repo)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| StageError::LookupFailed(format!("cannot run git: {}", e)))
    }
}

impl BranchLookup for GitLookup {
    fn current_branch(&self) -> Result<String, StageError> {
        tracing::debug!(repo = %self.repo.display(), "querying git for current branch");

        let mut child = self.spawn()?;
        let waited = child
            .wait_timeout(Duration::from_millis(self.timeout_ms))
            .map_err(|e| StageError::LookupFailed(format!("waiting for git: {}", e)))?;

        let Some(status) = waited else {
            kill_child(&mut child);
            return Err(StageError::LookupTimedOut(self.timeout_ms));
        };

        if !status.success() {
            return Err(StageError::LookupFailed(format!(
                "git {} exited with {}",
                GIT_ARGS.join(" "),
                status
            )));
        }

        // A branch name is far below the pipe buffer size, so reading after
        // exit cannot deadlock.
        let mut stdout = String::new();
        if let Some(mut pipe) = child.stdout.take() {
            pipe.read_to_string(&mut stdout)
                .map_err(|e| StageError::LookupFailed(format!("reading git output: {}", e)))?;
        }

        Ok(stdout.trim().to_string())
    }
}

fn kill_child(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "failed to kill timed out git process");
    }
    // Reap to avoid leaving a zombie behind.
    let _ = child.wait();
}
