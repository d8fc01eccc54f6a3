//! # Deployment Context
//!
//! Plain-data parameters a provisioning run consumes once the stage is known:
//! stack identifier, resource tags, function environment and target
//! account/region. Nothing here talks to a cloud vendor.

use crate::resolve::{EnvSignal, Resolution, first_usable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// DEFAULTS
// =============================================================================

/// Stack identifier prefix; the stack id is `<prefix>-<stage>`.
pub const DEFAULT_STACK_PREFIX: &str = "InfraStack";

/// Value of the `application` tag.
pub const DEFAULT_APPLICATION: &str = "Template_App";

/// Account signals, highest priority first.
pub const ACCOUNT_SIGNALS: [&str; 2] = ["AWS_ACCOUNT_ID", "CDK_DEFAULT_ACCOUNT"];

/// Region signals, highest priority first.
pub const REGION_SIGNALS: [&str; 2] = ["AWS_REGION", "CDK_DEFAULT_REGION"];

pub const TAG_STAGE: &str = "stage";
pub const TAG_BRANCH: &str = "branch";
pub const TAG_APPLICATION: &str = "application";

pub const ENV_STAGE: &str = "STAGE";
pub const ENV_BRANCH: &str = "BRANCH";
pub const ENV_TABLE: &str = "TABLE";

// =============================================================================
// SETTINGS
// =============================================================================

/// Naming inputs for a [`DeploymentContext`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSettings {
    pub stack_prefix: String,
    pub application: String,
    /// Table name handed to the function as `TABLE`, when known.
    pub table: Option<String>,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            stack_prefix: DEFAULT_STACK_PREFIX.to_string(),
            application: DEFAULT_APPLICATION.to_string(),
            table: None,
        }
    }
}

// =============================================================================
// TARGET
// =============================================================================

/// Target account and region. Either may be unknown; the provisioning
/// layer then falls back to its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployTarget {
    pub account: Option<String>,
    pub region: Option<String>,
}

impl DeployTarget {
    /// First usable account signal and first usable region signal.
    #[must_use]
    pub fn from_signals(account: &[EnvSignal], region: &[EnvSignal]) -> Self {
        let pick = |signals: &[EnvSignal]| {
            first_usable(signals)
                .and_then(|s| s.usable_value())
                .map(str::to_string)
        };
        Self {
            account: pick(account),
            region: pick(region),
        }
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// Everything the provisioning step needs from a resolver run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentContext {
    /// Stack identifier, also used as the stack name.
    pub stack_id: String,
    pub stage: String,
    pub branch: String,
    pub tags: BTreeMap<String, String>,
    pub function_env: BTreeMap<String, String>,
    pub target: DeployTarget,
}

impl DeploymentContext {
    #[must_use]
    pub fn new(resolution: &Resolution, settings: &ContextSettings, target: DeployTarget) -> Self {
        let stage = resolution.stage.as_str().to_string();
        let branch = resolution.branch.as_str().to_string();

        let mut tags = BTreeMap::new();
        tags.insert(TAG_STAGE.to_string(), stage.clone());
        tags.insert(TAG_BRANCH.to_string(), branch.clone());
        tags.insert(TAG_APPLICATION.to_string(), settings.application.clone());

        let mut function_env = BTreeMap::new();
        function_env.insert(ENV_STAGE.to_string(), stage.clone());
        function_env.insert(ENV_BRANCH.to_string(), branch.clone());
        if let Some(table) = settings.table.as_deref().map(str::trim)
            && !table.is_empty()
        {
            function_env.insert(ENV_TABLE.to_string(), table.to_string());
        }

        Self {
            stack_id: format!("{}-{}", settings.stack_prefix, stage),
            stage,
            branch,
            tags,
            function_env,
            target,
        }
    }

    #[must_use]
    pub fn stack_name(&self) -> &str {
        &self.stack_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{BranchSource, ResolvedBranch};
    use crate::types::BranchName;

    fn resolution(branch: &str) -> Resolution {
        Resolution::from_branch(ResolvedBranch {
            branch: BranchName::new(branch).expect("non-blank"),
            source: BranchSource::VersionControl,
        })
    }

    #[test]
    fn main_deploys_prod_stack() {
        let ctx = DeploymentContext::new(
            &resolution("main"),
            &ContextSettings::default(),
            DeployTarget::default(),
        );
        assert_eq!(ctx.stack_id, "InfraStack-prod");
        assert_eq!(ctx.stack_name(), "InfraStack-prod");
    }

    #[test]
    fn tags_are_exactly_stage_branch_application() {
        let ctx = DeploymentContext::new(
            &resolution("feature/login"),
            &ContextSettings::default(),
            DeployTarget::default(),
        );
        let keys: Vec<&str> = ctx.tags.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["application", "branch", "stage"]);
        assert_eq!(ctx.tags["stage"], "dev");
        assert_eq!(ctx.tags["branch"], "feature/login");
        assert_eq!(ctx.tags["application"], "Template_App");
    }

    #[test]
    fn function_env_includes_table_only_when_given() {
        let without = DeploymentContext::new(
            &resolution("develop"),
            &ContextSettings::default(),
            DeployTarget::default(),
        );
        assert_eq!(without.function_env.len(), 2);
        assert_eq!(without.function_env["STAGE"], "dev");
        assert_eq!(without.function_env["BRANCH"], "develop");

        let settings = ContextSettings {
            table: Some("orders-dev".to_string()),
            ..ContextSettings::default()
        };
        let with = DeploymentContext::new(&resolution("develop"), &settings, DeployTarget::default());
        assert_eq!(with.function_env["TABLE"], "orders-dev");
    }

    #[test]
    fn custom_prefix_and_application() {
        let settings = ContextSettings {
            stack_prefix: "WebStack".to_string(),
            application: "Storefront".to_string(),
            table: None,
        };
        let ctx = DeploymentContext::new(&resolution("Spike/Cache"), &settings, DeployTarget::default());
        assert_eq!(ctx.stack_id, "WebStack-spike-cache");
        assert_eq!(ctx.tags["application"], "Storefront");
    }

    #[test]
    fn target_prefers_explicit_over_cdk_defaults() {
        let account = vec![
            EnvSignal::set("AWS_ACCOUNT_ID", "111111111111"),
            EnvSignal::set("CDK_DEFAULT_ACCOUNT", "222222222222"),
        ];
        let region = vec![
            EnvSignal::set("AWS_REGION", " "),
            EnvSignal::set("CDK_DEFAULT_REGION", "eu-west-1"),
        ];
        let target = DeployTarget::from_signals(&account, &region);
        assert_eq!(target.account.as_deref(), Some("111111111111"));
        assert_eq!(target.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn blank_account_falls_through_to_cdk_default() {
        let account = vec![
            EnvSignal::set("AWS_ACCOUNT_ID", "   "),
            EnvSignal::set("CDK_DEFAULT_ACCOUNT", "222222222222"),
        ];
        let region = vec![
            EnvSignal::set("AWS_REGION", ""),
            EnvSignal::set("CDK_DEFAULT_REGION", "\t"),
        ];
        let target = DeployTarget::from_signals(&account, &region);
        assert_eq!(target.account.as_deref(), Some("222222222222"));
        assert_eq!(target.region, None);
    }

    #[test]
    fn target_unknown_when_unset() {
        let target = DeployTarget::from_signals(&[], &[EnvSignal::unset("AWS_REGION")]);
        assert_eq!(target, DeployTarget::default());
    }
}
