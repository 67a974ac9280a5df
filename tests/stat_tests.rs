//! Integration tests for `benchstat stat`
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

mod utils;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
use utils::{write_coverage_log, write_halved_summary};

fn benchstat() -> Command {
    Command::cargo_bin("benchstat").unwrap()
}

#[test]
fn test_cox_reports_faster_method() {
    let dir = TempDir::new().unwrap();
    write_halved_summary(dir.path(), "synthetic.csv", "Random", "3phstar");

    benchstat()
        .arg("stat")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Z: 4.1648"))
        .stdout(predicate::str::contains("Faster: 3phstar"))
        .stdout(predicate::str::contains("Significance: significant (***)"));
}

#[test]
fn test_cox_by_benchmark() {
    let dir = TempDir::new().unwrap();
    write_halved_summary(dir.path(), "synthetic.csv", "Random", "3phstar");

    benchstat()
        .args(["stat", "--by-benchmark", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Per-benchmark:"))
        .stdout(predicate::str::contains("  mp(5): Z=2.40"))
        .stdout(predicate::str::contains("  sb: Z=2.40"));
}

#[test]
fn test_cox_json_output() {
    let dir = TempDir::new().unwrap();
    write_halved_summary(dir.path(), "synthetic.csv", "Random", "3phstar");

    let output = benchstat()
        .args(["stat", "--format", "json", "--dir"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["overall"]["status"], "fitted");
    assert_eq!(parsed["overall"]["faster"], "3phstar");
    assert!(parsed["overall"]["fit"]["z"].as_f64().unwrap() > 0.0);
    assert_eq!(parsed["observations"], 60);
}

#[test]
fn test_cox_censoring_with_max_iter() {
    let dir = TempDir::new().unwrap();
    write_halved_summary(dir.path(), "synthetic.csv", "Random", "3phstar");

    // every run reached Iter=10, so a cap of 5 censors all of them
    benchstat()
        .args(["stat", "--max-iter", "5", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Censored: 60"))
        .stdout(predicate::str::contains("Model not fitted"));
}

#[test]
fn test_cox_custom_duration_column() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("runs.csv"),
        "Benchmark,Caption,Wall\nmp(5),Random,2\nmp(5),3phstar,1\nmp(5),Random,4\nmp(5),3phstar,3\n",
    )
    .unwrap();

    benchstat()
        .args(["stat", "--duration", "Wall", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Runs: 4"));
}

#[test]
fn test_no_usable_csv_exits_1() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.csv"), "Name,Value\na,1\n").unwrap();

    benchstat()
        .args(["stat", "--dir"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No usable CSVs found under"));
}

#[test]
fn test_no_records_for_methods_exits_1() {
    let dir = TempDir::new().unwrap();
    write_halved_summary(dir.path(), "synthetic.csv", "GenMC", "Other");

    benchstat()
        .args(["stat", "--dir"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "No records for methods Random and 3phstar",
        ));
}

fn write_rate_fixture(dir: &std::path::Path) {
    for bench in ["mp(5)", "sb"] {
        for i in 0..5 {
            write_coverage_log(
                dir,
                &format!("{}-rand-{}", bench, i),
                &[(1, 1, 1.0), (2, 10 + i, 10.0)],
            );
            write_coverage_log(
                dir,
                &format!("{}-fuzz-{}", bench, i),
                &[(1, 1, 1.0), (2, 50 + i, 10.0)],
            );
        }
    }
}

#[test]
fn test_coverage_rate_comparison() {
    let dir = TempDir::new().unwrap();
    write_rate_fixture(dir.path());

    benchstat()
        .args(["stat", "--analysis", "coverage", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Medians by benchmark:"))
        .stdout(predicate::str::contains("Weighted U: 0.000"))
        .stdout(predicate::str::contains("Highly significant difference (**)"))
        .stdout(predicate::str::contains("Winner (by overall median): 3phstar"));
}

#[test]
fn test_coverage_rate_json() {
    let dir = TempDir::new().unwrap();
    write_rate_fixture(dir.path());

    let output = benchstat()
        .args(["stat", "--analysis", "coverage", "--format", "json", "--dir"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["winner"], "3phstar");
    assert_eq!(parsed["runs"], 20);
    assert_eq!(parsed["test"]["strata"].as_array().unwrap().len(), 2);
}

#[test]
fn test_coverage_rate_from_aggregated_table() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("coverage.csv");
    let mut text = String::from("Benchmark,Caption,Coverage\n");
    for v in 1..=6 {
        text.push_str(&format!("mp(5),Random,{}\nmp(5),3phstar,{}\n", v, v + 100));
    }
    fs::write(&input, text).unwrap();

    benchstat()
        .args(["stat", "--analysis", "coverage", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Strata compared: 1"))
        .stdout(predicate::str::contains("Winner (by overall median): 3phstar"));
}

#[test]
fn test_coverage_without_matching_methods_exits_1() {
    let dir = TempDir::new().unwrap();
    write_coverage_log(dir.path(), "mp(5)-GenMC-0", &[(1, 5, 1.0)]);

    benchstat()
        .args(["stat", "--analysis", "coverage", "--dir"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No records for Random and 3phstar"));
}
