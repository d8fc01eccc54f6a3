//! # Configuration
//!
//! Optional `stagekit.toml`. Every key is optional:
//!
//! ```toml
//! application = "Template_App"
//! stack_prefix = "InfraStack"
//! git_timeout_ms = 5000
//! signals = ["GITHUB_HEAD_REF", "GITHUB_REF_NAME", "BRANCH_NAME", "CI_COMMIT_REF_NAME"]
//! ```
//!
//! Precedence: CLI flag > file > built-in default.

use crate::git::DEFAULT_GIT_TIMEOUT_MS;
use serde::Deserialize;
use stagekit_core::{
    ContextSettings, DEFAULT_APPLICATION, DEFAULT_BRANCH_SIGNALS, DEFAULT_STACK_PREFIX,
    StageError, StageResolver,
};
use std::path::Path;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "stagekit.toml";

/// Maximum config file size (64 KB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Value of the `application` tag.
    pub application: String,
    /// Stack id prefix.
    pub stack_prefix: String,
    /// Budget for the git fallback query.
    pub git_timeout_ms: u64,
    /// Branch signal names in priority order.
    pub signals: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            application: DEFAULT_APPLICATION.to_string(),
            stack_prefix: DEFAULT_STACK_PREFIX.to_string(),
            git_timeout_ms: DEFAULT_GIT_TIMEOUT_MS,
            signals: DEFAULT_BRANCH_SIGNALS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Parse and validate TOML content.
    pub fn from_toml(content: &str) -> Result<Self, StageError> {
        let settings: Settings =
            toml::from_str(content).map_err(|e| StageError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `explicit`, or from [`DEFAULT_CONFIG_FILE`] if present.
    ///
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, StageError> {
        let path = match explicit {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let metadata = std::fs::metadata(path).map_err(|e| {
            StageError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(StageError::Config(format!(
                "'{}' is {} bytes, maximum is {}",
                path.display(),
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            StageError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Self::from_toml(&content)
    }

    fn validate(&self) -> Result<(), StageError> {
        if self.stack_prefix.trim().is_empty() {
            return Err(StageError::Config("stack_prefix must not be empty".to_string()));
        }
        if self.application.trim().is_empty() {
            return Err(StageError::Config("application must not be empty".to_string()));
        }
        if self.git_timeout_ms == 0 {
            return Err(StageError::Config("git_timeout_ms must be positive".to_string()));
        }
        if let Some(blank) = self.signals.iter().position(|s| s.trim().is_empty()) {
            return Err(StageError::Config(format!("signals[{}] is empty", blank)));
        }
        Ok(())
    }

    /// Resolver using the configured signal order.
    #[must_use]
    pub fn resolver(&self) -> StageResolver {
        StageResolver::with_signals(self.signals.iter().cloned())
    }

    /// Context naming inputs, with an optional table name.
    #[must_use]
    pub fn context_settings(&self, table: Option<String>) -> ContextSettings {
        ContextSettings {
            stack_prefix: self.stack_prefix.clone(),
            application: self.application.clone(),
            table,
        }
    }
}
