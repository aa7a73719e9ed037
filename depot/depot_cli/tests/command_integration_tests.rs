use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn depot() -> Command {
    let mut cmd = Command::cargo_bin("depot").unwrap();
    cmd.env("RUST_LOG", "info");
    cmd
}

#[test]
fn test_run_executes_queries_and_exits() {
    depot()
        .args(["run", "--capacity", "2"])
        .write_stdin("SELECT * FROM users\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Press enter to run a query"))
        .stdout(predicate::str::contains("\"total_borrows\":1"))
        .stderr(predicate::str::contains(
            "Connection 0: running SELECT * FROM users",
        ));
}

#[test]
fn test_run_reports_exhaustion_while_slow_query_holds() {
    depot()
        .args(["run", "--capacity", "1", "--hold-secs", "1"])
        .write_stdin("SELECT slow 1\nSELECT fast\nexit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("connection pool exhausted"))
        .stdout(predicate::str::contains("\"exhausted\":1"))
        .stdout(predicate::str::contains("\"idle\":1"));
}

#[test]
fn test_simulate_sixth_worker_is_rejected() {
    depot()
        .args(["simulate", "--workers", "6", "--capacity", "5", "--hold-ms", "300"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"succeeded\": 5"))
        .stdout(predicate::str::contains("\"exhausted\": 1"));
}

#[test]
fn test_config_file_sets_capacity() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("depot.toml");
    fs::write(&path, "[pool]\ncapacity = 2\nname = \"from-file\"\n").unwrap();

    depot()
        .args(["--config", path.to_str().unwrap()])
        .args(["simulate", "--workers", "3", "--hold-ms", "300"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"capacity\": 2"))
        .stdout(predicate::str::contains("\"succeeded\": 2"))
        .stderr(predicate::str::contains("'from-file'"));
}

#[test]
fn test_missing_config_file_fails() {
    depot()
        .args(["--config", "/nonexistent/depot.toml", "simulate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}
