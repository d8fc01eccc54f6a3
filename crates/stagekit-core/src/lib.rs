//! # stagekit-core
//!
//! Deterministic branch-to-stage derivation - THE LOGIC.
//!
//! Given the CI environment signals of a provisioning run and a fallback
//! version-control lookup, this crate produces:
//! - the branch the run belongs to (`resolve` module)
//! - a bounded, normalized stage identifier (`rules` + `sanitize` modules)
//! - the stack id, tags and function environment derived from both
//!   (`deployment` module)
//!
//! ## Architectural Constraints
//!
//! - Pure: no process spawning, no environment reads, no file I/O.
//!   The binary injects all of those.
//! - Total: every input path ends in a valid [`Stage`]; lookup failures are
//!   absorbed into the `"local"` default.
//! - Deterministic: emitted maps are `BTreeMap`s.

// =============================================================================
// MODULES
// =============================================================================

pub mod deployment;
pub mod resolve;
pub mod rules;
pub mod sanitize;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{BranchName, LOCAL, MAX_STAGE_LEN, Stage, StageError, is_valid_stage};

// =============================================================================
// RE-EXPORTS: Resolver
// =============================================================================

pub use resolve::{
    BranchLookup, BranchSource, DEFAULT_BRANCH_SIGNALS, EnvSignal, Resolution, ResolvedBranch,
    StageResolver, collect_signals, resolve_branch,
};
pub use rules::{Derivation, Matcher, STAGE_RULES, StageClass, StageRule, derive, derive_stage};
pub use sanitize::sanitize_stage;

// =============================================================================
// RE-EXPORTS: Deployment (from deployment module)
// =============================================================================

pub use deployment::{
    ACCOUNT_SIGNALS, ContextSettings, DEFAULT_APPLICATION, DEFAULT_STACK_PREFIX, DeployTarget,
    DeploymentContext, REGION_SIGNALS,
};
