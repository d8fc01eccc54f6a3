//! # Core Type Definitions
//!
//! This module contains the value types shared by every stagekit component:
//! - Branch and stage identifiers (`BranchName`, `Stage`)
//! - Error types (`StageError`)
//!
//! ## Stage Invariant
//!
//! A [`Stage`] can only be built through constructors that enforce:
//! - non-empty
//! - only `[a-z0-9-]`
//! - no leading/trailing hyphen, no repeated hyphens
//! - at most [`MAX_STAGE_LEN`] characters

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Maximum length of a stage identifier.
pub const MAX_STAGE_LEN: usize = 20;

/// Literal used both as the fallback branch and the fallback stage.
pub const LOCAL: &str = "local";

// =============================================================================
// BRANCH NAME
// =============================================================================

/// A version-control branch name as reported by CI or git.
///
/// Free-form: may contain slashes, mixed case and unicode. Values produced
/// by the resolver are always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    /// Create a branch name from raw text, trimming surrounding whitespace.
    ///
    /// Returns `None` when nothing is left after trimming.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The `"local"` branch used when no other source is available.
    #[must_use]
    pub fn local() -> Self {
        Self(LOCAL.to_string())
    }

    /// Get the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// STAGE
// =============================================================================

/// A normalized deployment-environment identifier (`prod`, `dev`, or a
/// sanitized branch-derived name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Stage(String);

impl Stage {
    /// Validate an already-normalized stage identifier.
    ///
    /// This does NOT sanitize: use [`crate::sanitize_stage`] for arbitrary text.
    pub fn parse(value: &str) -> Result<Self, StageError> {
        if is_valid_stage(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(StageError::InvalidStage(value.to_string()))
        }
    }

    /// The production stage.
    #[must_use]
    pub fn prod() -> Self {
        Self("prod".to_string())
    }

    /// The shared development stage.
    #[must_use]
    pub fn dev() -> Self {
        Self("dev".to_string())
    }

    /// The fallback stage for empty or unusable input.
    #[must_use]
    pub fn local() -> Self {
        Self(LOCAL.to_string())
    }

    /// Get the stage as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap a value the caller has already normalized.
    pub(crate) fn from_normalized(value: String) -> Self {
        debug_assert!(is_valid_stage(&value), "not a valid stage: {value:?}");
        Self(value)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Stage {
    type Error = StageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid_stage(&value) {
            Ok(Self(value))
        } else {
            Err(StageError::InvalidStage(value))
        }
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> Self {
        stage.0
    }
}

/// Check whether `value` satisfies the stage invariant.
#[must_use]
pub fn is_valid_stage(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_STAGE_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in stagekit.
///
/// Lookup variants never escape branch resolution: the resolver absorbs
/// them into the `"local"` default. The rest surface from the binary.
#[derive(Debug, Error)]
pub enum StageError {
    /// Text does not satisfy the stage invariant.
    #[error("Invalid stage identifier: {0:?}")]
    InvalidStage(String),

    /// Version-control query could not produce a branch.
    #[error("Branch lookup failed: {0}")]
    LookupFailed(String),

    /// Version-control query exceeded its time budget.
    #[error("Branch lookup timed out after {0} ms")]
    LookupTimedOut(u64),

    /// Configuration file is unreadable or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O failure while producing output.
    #[error("I/O error: {0}")]
    Io(String),

    /// Output could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
