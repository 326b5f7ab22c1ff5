//! Integration tests for the failover-gen CLI
//!
//! These tests run the actual binary and verify output. Publish tests point
//! GITHUB_API_URL at a wiremock server.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONFIG: &str = r#"
failover_tasks:
  - Task: promote-replica
    Type: invoke-lambda
    resource: arn:aws:lambda:eu-west-1:123456789012:function:promote
    payload: '{"cluster": "orders"}'
    description: Promote the read replica
  - Task: drain-region
    Type: invoke-step-function
    resource: arn:aws:states:eu-west-1:123456789012:stateMachine:drain
    payload: '{}'
"#;

const CONTENTS_PATH: &str = "/repos/acme/infra/contents/.github/workflows/dynamic-workflow.yml";

/// Get the binary to test, isolated from the caller's environment
fn cli_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("failover-gen").unwrap();
    cmd.current_dir(dir)
        .env_remove("GITHUB_REPOSITORY")
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &TempDir, content: &str) {
    fs::write(dir.path().join("config.yaml"), content).unwrap();
}

#[test]
fn test_help_flag() {
    let dir = TempDir::new().unwrap();
    cli_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generate and publish failover CI workflows"));
}

#[test]
fn test_publish_help_lists_options() {
    let dir = TempDir::new().unwrap();
    cli_cmd(dir.path())
        .args(["publish", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--pull-request"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--repo"));
}

// ============================================================================
// validate / render / generate
// ============================================================================

#[test]
fn test_validate_valid_config() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);

    cli_cmd(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("Tasks: 2"))
        .stdout(predicate::str::contains("promote-replica [invoke-lambda] -> invoke-lambda.yaml"))
        .stdout(predicate::str::contains(
            "drain-region [invoke-step-function] -> invoke-step-function.yaml",
        ));
}

#[test]
fn test_validate_missing_field_fails() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        "failover_tasks:\n  - Task: broken\n    Type: invoke-lambda\n    payload: p\n",
    );

    cli_cmd(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing mandatory field 'resource'"))
        .stderr(predicate::str::contains("Fix:"));
}

#[test]
fn test_validate_missing_task_list_fails() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "tasks: []\n");

    cli_cmd(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failover_tasks"));
}

#[test]
fn test_validate_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    cli_cmd(dir.path())
        .args(["validate", "--config", "nope.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn test_render_prints_workflow() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);

    cli_cmd(dir.path())
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("name: Dynamic Workflow"))
        .stdout(predicate::str::contains("Run Task promote-replica - Promote the read replica"))
        .stdout(predicate::str::contains("uses: ./.github/workflows/invoke-step-function.yaml"));

    assert!(!dir.path().join(".github").exists());
}

#[test]
fn test_generate_writes_default_path() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);

    cli_cmd(dir.path())
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 tasks"));

    let written =
        fs::read_to_string(dir.path().join(".github/workflows/dynamic-workflow.yml")).unwrap();
    assert!(written.contains("uses: ./.github/workflows/invoke-lambda.yaml"));
}

#[test]
fn test_info_logs_by_default() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);

    cli_cmd(dir.path())
        .arg("generate")
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote workflow file"));
}

#[test]
fn test_rust_log_lowers_log_level() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);

    cli_cmd(dir.path())
        .arg("generate")
        .env("RUST_LOG", "warn")
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote workflow file").not());
}

#[test]
fn test_generate_custom_paths() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("failover.yaml"), CONFIG).unwrap();

    cli_cmd(dir.path())
        .args(["generate", "-c", "failover.yaml", "-o", "out/wf.yml"])
        .assert()
        .success();

    assert!(dir.path().join("out/wf.yml").is_file());
}

#[test]
fn test_render_matches_generate() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);

    let rendered = cli_cmd(dir.path()).arg("render").output().unwrap().stdout;
    cli_cmd(dir.path()).arg("generate").assert().success();

    let written = fs::read(dir.path().join(".github/workflows/dynamic-workflow.yml")).unwrap();
    assert_eq!(rendered, written);
}

// ============================================================================
// publish
// ============================================================================

#[test]
fn test_publish_dry_run_needs_no_credentials() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);

    cli_cmd(dir.path())
        .args(["publish", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert!(dir.path().join(".github/workflows/dynamic-workflow.yml").is_file());
}

#[test]
fn test_publish_without_token_fails() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);

    cli_cmd(dir.path())
        .args(["publish", "--repo", "acme/infra"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GITHUB_TOKEN"));
}

#[test]
fn test_publish_invalid_repo_fails() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);

    cli_cmd(dir.path())
        .args(["publish", "--repo", "not-a-repo"])
        .env("GITHUB_TOKEN", "t")
        .assert()
        .failure()
        .stderr(predicate::str::contains("owner/name"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_publish_creates_missing_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"commit": {"sha": "c0ffee"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);

    cli_cmd(dir.path())
        .arg("publish")
        .env("GITHUB_REPOSITORY", "acme/infra")
        .env("GITHUB_TOKEN", "t0ken")
        .env("GITHUB_API_URL", server.uri())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Created .github/workflows/dynamic-workflow.yml on acme/infra@main",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_publish_updates_existing_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "path": ".github/workflows/dynamic-workflow.yml",
            "sha": "abc123"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"commit": {"sha": "c0ffee"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);

    cli_cmd(dir.path())
        .arg("publish")
        .env("GITHUB_REPOSITORY", "acme/infra")
        .env("GITHUB_TOKEN", "t0ken")
        .env("GITHUB_API_URL", server.uri())
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_publish_api_error_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"message": "Resource not accessible"})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);

    cli_cmd(dir.path())
        .arg("publish")
        .env("GITHUB_REPOSITORY", "acme/infra")
        .env("GITHUB_TOKEN", "t0ken")
        .env("GITHUB_API_URL", server.uri())
        .assert()
        .failure()
        .stderr(predicate::str::contains("GitHub API error (403)"))
        .stderr(predicate::str::contains("contents:write"));
}
