//! Command-line behavior of the `scenesweep` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture_project() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/project")
}

fn scenesweep() -> Command {
    Command::cargo_bin("scenesweep").unwrap()
}

#[test]
fn test_no_arguments_prints_usage() {
    scenesweep()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: scenesweep"));
}

#[test]
fn test_single_argument_prints_usage() {
    scenesweep()
        .arg(fixture_project())
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: scenesweep"));
}

#[test]
fn test_missing_project_is_not_a_failure() {
    let out = TempDir::new().unwrap();
    scenesweep()
        .arg("/definitely/not/a/project")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("does not exist"));
}

#[test]
fn test_folder_without_assets_is_not_a_failure() {
    let project = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    scenesweep()
        .arg(project.path())
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("valid Unity project"));

    assert!(!out.path().join("UnusedScripts.csv").exists());
}

#[test]
fn test_full_run_writes_dumps_and_report() {
    let out = TempDir::new().unwrap();
    let output = out.path().join("nested/output");

    scenesweep()
        .arg(fixture_project())
        .arg(&output)
        .arg("--quiet")
        .assert()
        .success();

    assert!(output.join("Main.unity.dump").is_file());
    assert!(output.join("Level.unity.dump").is_file());

    let report = fs::read_to_string(output.join("UnusedScripts.csv")).unwrap();
    assert!(report.starts_with("Relative Path,GUID\n"));
    assert!(report.contains("Assets/Scripts/Unused.cs,"));
    assert!(!report.contains("Assets/Scripts/Player.cs"));
}

#[test]
fn test_summary_lists_unused_scripts() {
    let out = TempDir::new().unwrap();
    scenesweep()
        .arg(fixture_project())
        .arg(out.path())
        .arg("--workers")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("Assets/Scripts/Unused.cs"))
        .stdout(predicate::str::contains("UnusedScripts.csv"));
}

#[test]
fn test_json_format() {
    let out = TempDir::new().unwrap();
    scenesweep()
        .arg(fixture_project())
        .arg(out.path())
        .args(["--format", "json", "--quiet"])
        .assert()
        .success();

    let text = fs::read_to_string(out.path().join("UnusedScripts.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["total"], 7);
    assert_eq!(value["unused"].as_array().unwrap().len(), 3);
}

#[test]
fn test_build_settings_flag() {
    let out = TempDir::new().unwrap();
    scenesweep()
        .arg(fixture_project())
        .arg(out.path())
        .args(["--build-settings", "--quiet"])
        .assert()
        .success();

    assert!(out.path().join("Main.unity.dump").is_file());
    assert!(!out.path().join("Level.unity.dump").exists());
}

#[test]
fn test_zero_workers_is_rejected() {
    let out = TempDir::new().unwrap();
    scenesweep()
        .arg(fixture_project())
        .arg(out.path())
        .args(["--workers", "0", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("workers"));
}

#[test]
fn test_config_file_overrides_marker() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("sweep.toml");
    fs::write(&config, "dump_marker = \"..\"\n").unwrap();
    let out = dir.path().join("out");

    scenesweep()
        .arg(fixture_project())
        .arg(&out)
        .arg("--config")
        .arg(&config)
        .arg("--quiet")
        .assert()
        .success();

    let dump = fs::read_to_string(out.join("Level.unity.dump")).unwrap();
    assert_eq!(dump, "Spawner\n..Enemy\n..<prefab instance &900>\n");
}

#[test]
fn test_completions() {
    scenesweep()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scenesweep"));
}
