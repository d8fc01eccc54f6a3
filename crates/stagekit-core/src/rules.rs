//! # Branch Classification Rules
//!
//! Ordered table mapping well-known branch names and prefixes to stages.
//!
//! | # | Rule | Match | Stage |
//! |---|------|-------|-------|
//! | 1 | `production-names` | exact `main`, `master`, `prod`, `production` | `prod` |
//! | 2 | `development-names` | exact `develop`, `development`, `dev` | `dev` |
//! | 3 | `hotfix-branches` | prefix `hotfix/` | `prod` |
//! | 4 | `work-branches` | prefix `feature/`, `feat/`, `fix/`, `chore/` | `dev` |
//!
//! Matching is done on a lowercased copy of the branch. The first matching
//! rule wins; anything unmatched is sanitized into its own stage.
//!
//! A bare `hotfix` (no slash) matches none of the rules and is sanitized
//! to `hotfix`.

use crate::sanitize::sanitize_stage;
use crate::types::Stage;
use serde::Serialize;

// =============================================================================
// RULE TABLE
// =============================================================================

/// How a rule tests a lowercased branch name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "patterns", rename_all = "snake_case")]
pub enum Matcher {
    /// Branch equals one of the names.
    Exact(&'static [&'static str]),
    /// Branch starts with one of the prefixes.
    Prefix(&'static [&'static str]),
}

impl Matcher {
    /// Test a lowercased branch name.
    #[must_use]
    pub fn matches(&self, branch: &str) -> bool {
        match self {
            Matcher::Exact(names) => names.iter().any(|n| *n == branch),
            Matcher::Prefix(prefixes) => prefixes.iter().any(|p| branch.starts_with(p)),
        }
    }
}

/// Fixed stage a rule assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageClass {
    Prod,
    Dev,
}

impl StageClass {
    #[must_use]
    pub fn stage(self) -> Stage {
        match self {
            StageClass::Prod => Stage::prod(),
            StageClass::Dev => Stage::dev(),
        }
    }
}

/// A single `(matcher, outcome)` entry of the classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageRule {
    pub name: &'static str,
    pub matcher: Matcher,
    pub outcome: StageClass,
}

/// Classification table, evaluated top to bottom.
pub const STAGE_RULES: &[StageRule] = &[
    StageRule {
        name: "production-names",
        matcher: Matcher::Exact(&["main", "master", "prod", "production"]),
        outcome: StageClass::Prod,
    },
    StageRule {
        name: "development-names",
        matcher: Matcher::Exact(&["develop", "development", "dev"]),
        outcome: StageClass::Dev,
    },
    StageRule {
        name: "hotfix-branches",
        matcher: Matcher::Prefix(&["hotfix/"]),
        outcome: StageClass::Prod,
    },
    StageRule {
        name: "work-branches",
        matcher: Matcher::Prefix(&["feature/", "feat/", "fix/", "chore/"]),
        outcome: StageClass::Dev,
    },
];

// =============================================================================
// DERIVATION
// =============================================================================

/// Outcome of classifying a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Derivation {
    pub stage: Stage,
    /// Rule that matched, or `None` when the branch was sanitized.
    pub rule: Option<&'static StageRule>,
}

/// Find the first rule matching an already-lowercased branch.
#[must_use]
pub fn classify(lowered: &str) -> Option<&'static StageRule> {
    STAGE_RULES.iter().find(|rule| rule.matcher.matches(lowered))
}

/// Classify a branch and report which rule (if any) decided the stage.
#[must_use]
pub fn derive(branch: &str) -> Derivation {
    let lowered = branch.to_lowercase();
    match classify(&lowered) {
        Some(rule) => Derivation {
            stage: rule.outcome.stage(),
            rule: Some(rule),
        },
        None => Derivation {
            stage: sanitize_stage(&lowered),
            rule: None,
        },
    }
}

/// Derive the stage for a branch. Total: never fails.
#[must_use]
pub fn derive_stage(branch: &str) -> Stage {
    derive(branch).stage
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_names_any_case() {
        for branch in ["main", "MAIN", "Master", "prod", "PrOd", "production"] {
            assert_eq!(derive_stage(branch), Stage::prod(), "branch {branch}");
        }
    }

    #[test]
    fn development_names_any_case() {
        for branch in ["develop", "Development", "DEV"] {
            assert_eq!(derive_stage(branch), Stage::dev(), "branch {branch}");
        }
    }

    #[test]
    fn hotfix_prefix_is_prod() {
        assert_eq!(derive_stage("hotfix/urgent-1"), Stage::prod());
        assert_eq!(derive_stage("HotFix/Payment"), Stage::prod());
    }

    #[test]
    fn work_prefixes_are_dev() {
        for branch in ["feature/login", "feat/x", "fix/typo", "chore/deps", "FEATURE/Big"] {
            assert_eq!(derive_stage(branch), Stage::dev(), "branch {branch}");
        }
    }

    #[test]
    fn bare_hotfix_falls_through_to_sanitation() {
        let derivation = derive("hotfix");
        assert_eq!(derivation.stage.as_str(), "hotfix");
        assert!(derivation.rule.is_none());
    }

    #[test]
    fn prefix_only_without_slash_is_not_a_work_branch() {
        assert_eq!(derive_stage("features-x").as_str(), "features-x");
        assert_eq!(derive_stage("fixup").as_str(), "fixup");
    }

    #[test]
    fn unmatched_branch_is_sanitized() {
        assert_eq!(derive_stage("Release/2024-W12!!").as_str(), "release-2024-w12");
        assert_eq!(derive_stage("").as_str(), "local");
    }

    #[test]
    fn first_matching_rule_wins() {
        let derivation = derive("prod");
        assert_eq!(derivation.rule.map(|r| r.name), Some("production-names"));

        let derivation = derive("hotfix/feature/x");
        assert_eq!(derivation.rule.map(|r| r.name), Some("hotfix-branches"));
        assert_eq!(derivation.stage, Stage::prod());
    }

    #[test]
    fn rule_table_order() {
        let names: Vec<&str> = STAGE_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "production-names",
                "development-names",
                "hotfix-branches",
                "work-branches"
            ]
        );
    }
}
