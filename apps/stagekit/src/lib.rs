//! # stagekit
//!
//! Library half of the stagekit binary: CLI definition, configuration and
//! the git-backed fallback lookup. All process state (environment, git,
//! files) is read here and handed to `stagekit-core` as plain data.

pub mod cli;
pub mod config;
pub mod git;
