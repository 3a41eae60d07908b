#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn dbx() -> Command {
    let mut cmd = Command::cargo_bin("dbx").unwrap();
    cmd.env_remove("DATABRICKS_WORKSPACE_URL")
        .env_remove("DATABRICKS_ACCESS_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

// ---------------------------------------------------------------------------
// argument handling
// ---------------------------------------------------------------------------

#[test]
fn help_lists_commands() {
    dbx()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("cluster"))
        .stdout(predicate::str::contains("ping"));
}

#[test]
fn malformed_param_is_rejected() {
    dbx()
        .args(["run", "Survey Processing Job", "--param", "novalue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
fn install_requires_cluster() {
    dbx()
        .args(["install", "dbfs:/FileStore/jars/a.whl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--cluster"));
}

// ---------------------------------------------------------------------------
// configuration
// ---------------------------------------------------------------------------

#[test]
fn missing_credentials_are_all_named() {
    dbx()
        .arg("ping")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("DATABRICKS_WORKSPACE_URL"))
        .stderr(predicate::str::contains("DATABRICKS_ACCESS_TOKEN"));
}

#[test]
fn token_from_env_still_needs_url() {
    dbx()
        .env("DATABRICKS_ACCESS_TOKEN", "dapi-test")
        .args(["run", "Nightly Export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABRICKS_WORKSPACE_URL"))
        .stderr(predicate::str::contains("DATABRICKS_ACCESS_TOKEN").not());
}

#[test]
fn unreachable_workspace_fails_ping() {
    dbx()
        .args([
            "--workspace-url",
            "http://127.0.0.1:1",
            "--token",
            "dapi-test",
            "--timeout-secs",
            "5",
            "ping",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot reach workspace http://127.0.0.1:1"));
}

// ---------------------------------------------------------------------------
// dbx deploy
// ---------------------------------------------------------------------------

#[test]
fn deploy_rejects_missing_bundle_dir() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("no_such_bundle");
    dbx()
        .env("DATABRICKS_WORKSPACE_URL", "http://127.0.0.1:1")
        .env("DATABRICKS_ACCESS_TOKEN", "dapi-test")
        .arg("deploy")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("bundle directory not found"));
}

#[test]
fn deploy_without_credentials_fails_before_building() {
    let dir = TempDir::new().unwrap();
    dbx()
        .arg("deploy")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABRICKS_WORKSPACE_URL"));
    assert!(!dir.path().join("dist").exists());
}
