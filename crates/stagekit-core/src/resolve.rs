//! # Branch Resolution
//!
//! Picks the branch for the current provisioning run and derives its stage.
//!
//! Sources, in order:
//! 1. CI environment signals, first present and non-blank wins
//! 2. the version-control fallback lookup (invoked at most once, and only
//!    when no signal is usable)
//! 3. the literal `"local"` when the lookup fails for any reason
//!
//! Environment values are passed in explicitly as [`EnvSignal`]s; this
//! module never reads process state.

use crate::rules::{Derivation, derive};
use crate::types::{BranchName, Stage, StageError};
use serde::{Deserialize, Serialize};

// =============================================================================
// SIGNALS
// =============================================================================

/// Default branch signal order: GitHub Actions first, then generic CI.
pub const DEFAULT_BRANCH_SIGNALS: [&str; 4] = [
    "GITHUB_HEAD_REF",
    "GITHUB_REF_NAME",
    "BRANCH_NAME",
    "CI_COMMIT_REF_NAME",
];

/// A named environment input and its value, if set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvSignal {
    pub name: String,
    pub value: Option<String>,
}

impl EnvSignal {
    #[must_use]
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// A signal that is set.
    #[must_use]
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, Some(value.into()))
    }

    /// A signal that is not set.
    #[must_use]
    pub fn unset(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    /// Trimmed value, or `None` when unset or blank.
    #[must_use]
    pub fn usable_value(&self) -> Option<&str> {
        self.value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Read the named signals through `read`, preserving order.
///
/// `read` is typically `|name| std::env::var(name).ok()`.
pub fn collect_signals<S, F>(names: &[S], read: F) -> Vec<EnvSignal>
where
    S: AsRef<str>,
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            EnvSignal::new(name, read(name))
        })
        .collect()
}

/// First signal with a usable value.
#[must_use]
pub fn first_usable(signals: &[EnvSignal]) -> Option<&EnvSignal> {
    signals.iter().find(|s| s.usable_value().is_some())
}

// =============================================================================
// FALLBACK LOOKUP
// =============================================================================

/// Version-control query for the checked-out branch.
///
/// Implementations may block; failures of any kind are reported as
/// [`StageError::LookupFailed`] or [`StageError::LookupTimedOut`] and are
/// absorbed by the resolver.
pub trait BranchLookup {
    fn current_branch(&self) -> Result<String, StageError>;
}

impl<F> BranchLookup for F
where
    F: Fn() -> Result<String, StageError>,
{
    fn current_branch(&self) -> Result<String, StageError> {
        self()
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Where the resolved branch came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum BranchSource {
    /// A CI environment variable.
    Signal(String),
    /// The version-control fallback query.
    VersionControl,
    /// Nothing usable; the `"local"` default.
    Default,
}

impl std::fmt::Display for BranchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BranchSource::Signal(name) => write!(f, "env:{}", name),
            BranchSource::VersionControl => f.write_str("git"),
            BranchSource::Default => f.write_str("default"),
        }
    }
}

/// A branch together with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBranch {
    pub branch: BranchName,
    pub source: BranchSource,
}

/// Resolve the branch from signals, falling back to `lookup`.
///
/// Never fails. `lookup` is not called when a signal is usable.
pub fn resolve_branch(signals: &[EnvSignal], lookup: &dyn BranchLookup) -> ResolvedBranch {
    let from_env = signals.iter().find_map(|signal| {
        signal
            .usable_value()
            .and_then(BranchName::new)
            .map(|branch| (signal, branch))
    });

    if let Some((signal, branch)) = from_env {
        tracing::debug!(signal = %signal.name, branch = %branch, "branch from environment");
        return ResolvedBranch {
            branch,
            source: BranchSource::Signal(signal.name.clone()),
        };
    }

    match lookup.current_branch() {
        Ok(raw) => match BranchName::new(&raw) {
            Some(branch) => {
                tracing::debug!(branch = %branch, "branch from version control");
                ResolvedBranch {
                    branch,
                    source: BranchSource::VersionControl,
                }
            }
            None => {
                tracing::debug!("version control returned an empty branch, using default");
                local_branch()
            }
        },
        Err(e) => {
            tracing::debug!(error = %e, "branch lookup failed, using default");
            local_branch()
        }
    }
}

fn local_branch() -> ResolvedBranch {
    ResolvedBranch {
        branch: BranchName::local(),
        source: BranchSource::Default,
    }
}

/// Full result of a resolver run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub branch: BranchName,
    pub source: BranchSource,
    pub stage: Stage,
    /// Name of the classification rule that matched, if any.
    pub rule: Option<&'static str>,
}

impl Resolution {
    /// Derive the stage for an already-resolved branch.
    #[must_use]
    pub fn from_branch(resolved: ResolvedBranch) -> Self {
        let Derivation { stage, rule } = derive(resolved.branch.as_str());
        Self {
            branch: resolved.branch,
            source: resolved.source,
            stage,
            rule: rule.map(|r| r.name),
        }
    }
}

/// Branch-to-stage resolver with a configurable signal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResolver {
    signal_names: Vec<String>,
}

impl Default for StageResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl StageResolver {
    /// Create a resolver using [`DEFAULT_BRANCH_SIGNALS`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_signals(DEFAULT_BRANCH_SIGNALS)
    }

    /// Create a resolver with a custom signal order.
    #[must_use]
    pub fn with_signals<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            signal_names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Signal names in priority order.
    #[must_use]
    pub fn signal_names(&self) -> &[String] {
        &self.signal_names
    }

    /// Read this resolver's signals through `read`.
    pub fn collect<F>(&self, read: F) -> Vec<EnvSignal>
    where
        F: Fn(&str) -> Option<String>,
    {
        collect_signals(&self.signal_names, read)
    }

    /// Resolve branch and stage from explicit signals and a fallback lookup.
    pub fn resolve(&self, signals: &[EnvSignal], lookup: &dyn BranchLookup) -> Resolution {
        let resolution = Resolution::from_branch(resolve_branch(signals, lookup));
        tracing::info!(
            branch = %resolution.branch,
            source = %resolution.source,
            stage = %resolution.stage,
            "resolved deployment stage"
        );
        resolution
    }
}
