//! Integration tests for the stagekit binary.
//!
//! Every command runs with a cleared environment inside a temp directory,
//! so neither the host's CI variables nor an enclosing git checkout leak in.
//! The git fallback therefore always fails and resolves to `local`.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// A stagekit command with an empty environment, run in a fresh temp dir.
fn stagekit(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stagekit").unwrap();
    cmd.env_clear().current_dir(dir.path());
    if let Some(parent) = dir.path().parent() {
        cmd.env("GIT_CEILING_DIRECTORIES", parent);
    }
    cmd
}

// =============================================================================
// RESOLVE
// =============================================================================

#[test]
fn head_ref_wins_over_branch_name() {
    let dir = TempDir::new().unwrap();
    stagekit(&dir)
        .args(["resolve"])
        .env("GITHUB_HEAD_REF", "feature/login")
        .env("BRANCH_NAME", "ignored")
        .assert()
        .success()
        .stdout(predicate::str::contains("Branch: feature/login"))
        .stdout(predicate::str::contains("Source: env:GITHUB_HEAD_REF"))
        .stdout(predicate::str::contains("Stage:  dev"));
}

#[test]
fn no_signals_and_no_git_is_local() {
    let dir = TempDir::new().unwrap();
    stagekit(&dir)
        .args(["resolve", "--short"])
        .assert()
        .success()
        .stdout("local\n");
}

#[test]
fn default_command_is_resolve() {
    let dir = TempDir::new().unwrap();
    stagekit(&dir)
        .env("CI_COMMIT_REF_NAME", "main")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stage:  prod"))
        .stdout(predicate::str::contains("Rule:   production-names"));
}

#[test]
fn resolve_json() {
    let dir = TempDir::new().unwrap();
    let output = stagekit(&dir)
        .args(["--json-mode", "resolve"])
        .env("GITHUB_REF_NAME", "Release/2024-W12!!")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["branch"], "Release/2024-W12!!");
    assert_eq!(json["stage"], "release-2024-w12");
    assert_eq!(json["source"]["kind"], "signal");
    assert_eq!(json["source"]["name"], "GITHUB_REF_NAME");
    assert!(json["rule"].is_null());
}

// =============================================================================
// DERIVE / SANITIZE
// =============================================================================

#[test]
fn derive_prints_stage() {
    let dir = TempDir::new().unwrap();
    stagekit(&dir)
        .args(["derive", "HOTFIX/payments"])
        .assert()
        .success()
        .stdout("prod\n");
}

#[test]
fn derive_bare_hotfix_is_not_prod() {
    let dir = TempDir::new().unwrap();
    stagekit(&dir)
        .args(["derive", "hotfix"])
        .assert()
        .success()
        .stdout("hotfix\n");
}

#[test]
fn sanitize_truncates() {
    let dir = TempDir::new().unwrap();
    stagekit(&dir)
        .arg("sanitize")
        .arg("a".repeat(30))
        .assert()
        .success()
        .stdout(format!("{}\n", "a".repeat(20)));
}

// =============================================================================
// CONTEXT / ENV
// =============================================================================

#[test]
fn context_json_has_stack_tags_and_env() {
    let dir = TempDir::new().unwrap();
    let output = stagekit(&dir)
        .args(["--json-mode", "context", "--table", "orders"])
        .env("BRANCH_NAME", "develop")
        .env("AWS_ACCOUNT_ID", "123456789012")
        .env("CDK_DEFAULT_REGION", "eu-central-1")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stack_id"], "InfraStack-dev");
    assert_eq!(json["tags"]["stage"], "dev");
    assert_eq!(json["tags"]["branch"], "develop");
    assert_eq!(json["tags"]["application"], "Template_App");
    assert_eq!(json["function_env"]["STAGE"], "dev");
    assert_eq!(json["function_env"]["BRANCH"], "develop");
    assert_eq!(json["function_env"]["TABLE"], "orders");
    assert_eq!(json["target"]["account"], "123456789012");
    assert_eq!(json["target"]["region"], "eu-central-1");
}

#[test]
fn env_prints_quoted_exports() {
    let dir = TempDir::new().unwrap();
    stagekit(&dir)
        .args(["env"])
        .env("GITHUB_HEAD_REF", "fix/it's")
        .assert()
        .success()
        .stdout("export BRANCH='fix/it'\\''s'\nexport STAGE='dev'\n");
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[test]
fn config_file_in_working_dir_is_used() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("stagekit.toml"),
        "stack_prefix = \"WebStack\"\napplication = \"Storefront\"\nsignals = [\"DEPLOY_BRANCH\"]\n",
    )
    .unwrap();

    let output = stagekit(&dir)
        .args(["--json-mode", "context"])
        .env("DEPLOY_BRANCH", "main")
        .env("GITHUB_HEAD_REF", "feature/ignored")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stack_id"], "WebStack-prod");
    assert_eq!(json["tags"]["application"], "Storefront");
}

#[test]
fn missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    stagekit(&dir)
        .args(["--config", "absent.toml", "resolve"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn malformed_config_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("stagekit.toml"), "git_timeout_ms = \"soon\"\n").unwrap();
    stagekit(&dir).args(["resolve"]).assert().failure();
}

#[test]
fn zero_timeout_flag_rejected() {
    let dir = TempDir::new().unwrap();
    stagekit(&dir)
        .args(["--git-timeout-ms", "0", "resolve"])
        .assert()
        .failure();
}
