//! Integration tests for `benchstat plot` paths that do not render
//!
//! Rendering needs a system font, so these cover discovery and error
//! handling only; curve data is tested in the library.
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_errorbar_without_matching_csv_exits_1() {
    let dir = TempDir::new().unwrap();
    let pattern = dir.path().join("4versions-*.csv");

    let mut cmd = Command::cargo_bin("benchstat").unwrap();
    cmd.args(["plot", "errorbar", "--glob"])
        .arg(pattern.to_str().unwrap())
        .arg("--plot-dir")
        .arg(dir.path().join("plots"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No usable CSVs match"));
}

#[test]
fn test_errorbar_skips_family_without_data() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("4versions-a.csv"),
        "Benchmark,Method,Sec\nms-queue(3),GenMC,1.0\n",
    )
    .unwrap();
    let plots = dir.path().join("plots");

    let mut cmd = Command::cargo_bin("benchstat").unwrap();
    cmd.args(["plot", "errorbar", "--glob"])
        .arg(dir.path().join("4versions-*.csv").to_str().unwrap())
        .arg("--plot-dir")
        .arg(&plots)
        .assert()
        .success()
        .stdout(predicate::str::contains("Plots written: 0"))
        .stdout(predicate::str::contains("Skipped: ms-queue"));
    assert!(plots.is_dir());
}

#[test]
fn test_coverage_plot_without_runs_writes_nothing() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), "not a run").unwrap();
    let plots = dir.path().join("plots");

    let mut cmd = Command::cargo_bin("benchstat").unwrap();
    cmd.args(["plot", "coverage", "--dir"])
        .arg(dir.path())
        .arg("--plot-dir")
        .arg(&plots)
        .assert()
        .success()
        .stdout(predicate::str::contains("Plots written: 0"));
    assert_eq!(fs::read_dir(&plots).unwrap().count(), 0);
}

#[test]
fn test_coverage_time_missing_verify_file_fails() {
    let dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("benchstat").unwrap();
    cmd.args(["plot", "coverage-time", "--dir"])
        .arg(dir.path())
        .arg("--plot-dir")
        .arg(dir.path().join("plots"))
        .arg("--verify")
        .arg(dir.path().join("verify.csv"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("verify.csv"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "significance_level = 2.0\n").unwrap();

    let mut cmd = Command::cargo_bin("benchstat").unwrap();
    cmd.arg("--config")
        .arg(&config)
        .args(["plot", "coverage", "--dir"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to load config"));
}
