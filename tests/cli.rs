use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn devfile_lint() -> Command {
    let mut cmd = Command::cargo_bin("devfile-lint").unwrap();
    cmd.env_remove("DEVFILE_LINT_FORMAT").env("NO_COLOR", "1");
    cmd
}

#[test]
fn validate_accepts_valid_devfile() {
    devfile_lint()
        .arg("validate")
        .arg(fixture("valid"))
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
}

#[test]
fn validate_is_the_default_command() {
    devfile_lint()
        .current_dir(fixture("valid"))
        .assert()
        .success()
        .stdout(predicate::str::contains("devfile.yaml is valid"));
}

#[test]
fn validate_lists_violations_and_fails() {
    devfile_lint()
        .arg("validate")
        .arg(fixture("invalid"))
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "[reserved-env] env variable PROJECTS_ROOT is reserved and cannot be customized in component runtime",
        ))
        .stderr(predicate::str::contains("has 10 validation problem(s)"));
}

#[test]
fn json_format_prints_records() -> Result<(), Box<dyn std::error::Error>> {
    let output = devfile_lint()
        .args(["--format", "json", "validate"])
        .arg(fixture("invalid"))
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let records: Value = serde_json::from_slice(&output)?;
    let records = records.as_array().ok_or("expected a JSON array")?;
    assert_eq!(records.len(), 10);
    assert_eq!(records[9]["kind"], "missing-checkout-remote");
    assert_eq!(records[9]["entity"], "app");
    Ok(())
}

#[test]
fn format_can_come_from_environment() {
    devfile_lint()
        .env("DEVFILE_LINT_FORMAT", "json")
        .arg("validate")
        .arg(fixture("valid"))
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn malformed_devfile_fails_to_parse() {
    devfile_lint()
        .arg("validate")
        .arg(fixture("malformed"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse"));
}

#[test]
fn missing_devfile_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    devfile_lint()
        .arg("validate")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no devfile found"));
    Ok(())
}

#[test]
fn graph_prints_dot() {
    devfile_lint()
        .arg("graph")
        .arg(fixture("valid"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph Commands {"))
        .stdout(predicate::str::contains("\"install\" -> \"build-and-run\";"))
        .stdout(predicate::str::contains("\"run\" -> \"build-and-run\";"));
}

#[test]
fn graph_writes_dot_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let out = dir.path().join("commands.dot");

    devfile_lint()
        .arg("graph")
        .arg(fixture("valid"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Graph saved to:"));

    let dot = fs::read_to_string(&out)?;
    assert!(dot.contains("subgraph cluster_build"));
    Ok(())
}

#[test]
fn graph_refuses_invalid_devfile() {
    devfile_lint()
        .arg("graph")
        .arg(fixture("invalid"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation problem(s)"));
}

#[test]
fn graph_order_lists_sub_commands_first() -> Result<(), Box<dyn std::error::Error>> {
    let output = devfile_lint()
        .args(["graph", "--order"])
        .arg(fixture("valid"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output)?;
    let ids: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.split_once(". ").map(|(_, id)| id))
        .collect();
    assert_eq!(ids.len(), 5);

    let position = |id: &str| ids.iter().position(|c| *c == id);
    assert!(position("install") < position("build-and-run"));
    assert!(position("run") < position("build-and-run"));
    Ok(())
}
