// Fixture helpers shared by the integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const COVERAGE_HEADER: &str = "Iter,Cover,SecElapsed";

/// Write a coverage log with a header and the given (iter, cover, sec) rows
pub fn write_coverage_log(dir: &Path, name: &str, rows: &[(i64, i64, f64)]) -> PathBuf {
    let mut text = format!("{}\n", COVERAGE_HEADER);
    for (iter, cover, sec) in rows {
        text.push_str(&format!("{},{},{}\n", iter, cover, sec));
    }
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

/// Summary CSV where `fast` takes half as long as `slow` on every run
///
/// Three benchmarks of ten runs each, no censoring.
pub fn write_halved_summary(dir: &Path, name: &str, slow: &str, fast: &str) -> PathBuf {
    let mut text = String::from("Benchmark,Method,Sec,Iter\n");
    for (bench, scale) in [("mp(5)", 1.0), ("sb", 3.0), ("lb", 0.5)] {
        for k in 1..=10 {
            let k = k as f64;
            text.push_str(&format!("{},{},{},{}\n", bench, slow, 2.0 * k * scale, 10));
            text.push_str(&format!("{},{},{},{}\n", bench, fast, k * scale, 10));
        }
    }
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}
