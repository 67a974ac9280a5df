//! Coverage-rate comparison between two methods
//!
//! A run's coverage rate is its final distinct-state count divided by its
//! final elapsed time, both taken from the last valid line of the log. Rates
//! are compared per benchmark with a stratified Mann-Whitney U test.

use super::Report;
use crate::config::AnalysisConfig;
use crate::descriptive::median;
use crate::error::{AnalysisError, Result};
use crate::hypothesis::{stratified_mann_whitney, Observation, Significance, StratifiedTest};
use crate::loader::{last_valid_point, list_files, load_summary_csv};
use crate::record::{CoveragePoint, RunName};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Coverage rate of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageRate {
    pub benchmark: String,
    pub method: String,
    pub rate: f64,
    pub source: PathBuf,
}

/// Distinct states discovered per second
///
/// # Example
/// ```
/// use benchstat::analysis::coverage_rate;
/// use benchstat::record::CoveragePoint;
///
/// let last = CoveragePoint { iter: 3, cover: 9, sec_elapsed: 3.5 };
/// assert!((coverage_rate(&last) - 2.571).abs() < 1e-3);
/// ```
pub fn coverage_rate(last: &CoveragePoint) -> f64 {
    if last.sec_elapsed > 0.0 {
        last.cover as f64 / last.sec_elapsed
    } else {
        0.0
    }
}

fn rate_of_file(path: &Path, config: &AnalysisConfig) -> Result<Option<CoverageRate>> {
    let Some(name) = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(RunName::parse)
    else {
        tracing::debug!("ignoring {}: not a run file", path.display());
        return Ok(None);
    };
    if name.is_time {
        return Ok(None);
    }

    let size = fs::metadata(path)
        .map_err(|e| AnalysisError::io(path, e))?
        .len();
    if size == 0 {
        return Ok(None);
    }

    let Some(last) = last_valid_point(path)? else {
        tracing::debug!("ignoring {}: no valid data line", path.display());
        return Ok(None);
    };

    Ok(Some(CoverageRate {
        method: config.canonical_method(&name.method).to_string(),
        benchmark: name.benchmark,
        rate: coverage_rate(&last),
        source: path.to_path_buf(),
    }))
}

/// Coverage rate of every run log under `dir` (recursive)
///
/// Empty files, files without a valid data line and files that cannot be
/// read are skipped.
pub fn load_coverage_rates(dir: &Path, config: &AnalysisConfig) -> Result<Vec<CoverageRate>> {
    let mut rates = Vec::new();
    for path in list_files(dir, true)? {
        match rate_of_file(&path, config) {
            Ok(Some(rate)) => rates.push(rate),
            Ok(None) => {}
            Err(e) => tracing::warn!("skipping {}: {}", path.display(), e),
        }
    }
    Ok(rates)
}

/// Coverage rates from a pre-aggregated `Benchmark,Caption,Coverage` table
pub fn load_rate_table(path: &Path) -> Result<Vec<CoverageRate>> {
    Ok(load_summary_csv(path, "Coverage")?
        .into_iter()
        .filter_map(|r| {
            Some(CoverageRate {
                rate: r.duration?,
                benchmark: r.benchmark,
                method: r.method,
                source: path.to_path_buf(),
            })
        })
        .collect())
}

/// Median rates of one benchmark
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedianRow {
    pub benchmark: String,
    pub first: Option<f64>,
    pub second: Option<f64>,
}

/// Outcome of a coverage-rate comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageComparison {
    pub source: String,
    pub first_method: String,
    pub second_method: String,
    pub runs: usize,
    pub medians: Vec<MedianRow>,
    pub test: StratifiedTest,
    pub significance: Significance,
    /// Method with the larger overall median rate, or "Tie"
    pub winner: String,
}

/// Compare coverage rates of `m1` and `m2` across benchmarks
///
/// `m1` observations are ordered first so every reported U belongs to `m1`.
pub fn compare_coverage_rates(
    source: &str,
    rates: &[CoverageRate],
    m1: &str,
    m2: &str,
    config: &AnalysisConfig,
) -> Result<CoverageComparison> {
    if rates.is_empty() {
        return Err(AnalysisError::NoData(format!(
            "No coverage data found under {}",
            source
        )));
    }

    let mut selected: Vec<&CoverageRate> = rates
        .iter()
        .filter(|r| r.method == m1 || r.method == m2)
        .collect();
    if selected.is_empty() {
        return Err(AnalysisError::NoData(format!(
            "No records for {} and {} under {}",
            m1, m2, source
        )));
    }
    selected.sort_by_key(|r| r.method != m1);

    let mut by_benchmark: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for rate in &selected {
        let entry = by_benchmark.entry(&rate.benchmark).or_default();
        if rate.method == m1 {
            entry.0.push(rate.rate);
        } else {
            entry.1.push(rate.rate);
        }
    }
    let medians = by_benchmark
        .iter()
        .map(|(benchmark, (first, second))| MedianRow {
            benchmark: benchmark.to_string(),
            first: median(first),
            second: median(second),
        })
        .collect();

    let observations: Vec<Observation> = selected
        .iter()
        .map(|r| Observation {
            stratum: r.benchmark.clone(),
            group: r.method.clone(),
            value: r.rate,
        })
        .collect();
    let test = stratified_mann_whitney(&observations)?;
    let significance = Significance::classify(test.combined_p, config);

    let overall = |method: &str| -> f64 {
        let values: Vec<f64> = selected
            .iter()
            .filter(|r| r.method == method)
            .map(|r| r.rate)
            .collect();
        median(&values).unwrap_or(0.0)
    };
    let (first_median, second_median) = (overall(m1), overall(m2));
    let winner = if second_median > first_median {
        m2.to_string()
    } else if second_median < first_median {
        m1.to_string()
    } else {
        "Tie".to_string()
    };

    Ok(CoverageComparison {
        source: source.to_string(),
        first_method: m1.to_string(),
        second_method: m2.to_string(),
        runs: selected.len(),
        medians,
        test,
        significance,
        winner,
    })
}

fn fmt_cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
}

impl Report for CoverageComparison {
    fn to_report_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", "=".repeat(80));
        let _ = writeln!(out, "Coverage benchmark set: {}", self.source);
        let _ = writeln!(
            out,
            "Compare {} vs {} on coverage rate = Cover/SecElapsed (last line per run)",
            self.first_method, self.second_method
        );
        let _ = writeln!(out, "Medians by benchmark:");

        let width = self
            .medians
            .iter()
            .map(|r| r.benchmark.len())
            .max()
            .unwrap_or(9)
            .max(9);
        let _ = writeln!(
            out,
            "{:<width$}  {:>12}  {:>12}",
            "Benchmark",
            self.first_method,
            self.second_method,
            width = width
        );
        for row in &self.medians {
            let _ = writeln!(
                out,
                "{:<width$}  {:>12}  {:>12}",
                row.benchmark,
                fmt_cell(row.first),
                fmt_cell(row.second),
                width = width
            );
        }

        let _ = writeln!(out, "\nStratified Mann-Whitney U Test (by Benchmark):");
        let _ = writeln!(out, "  Strata compared: {}", self.test.strata.len());
        if !self.test.skipped.is_empty() {
            let _ = writeln!(out, "  Strata skipped: {}", self.test.skipped.join(", "));
        }
        let _ = writeln!(out, "  Weighted U: {:.3}", self.test.weighted_u);
        let _ = writeln!(out, "  Combined P: {:.6e}", self.test.combined_p);
        let _ = writeln!(out, "  Result: {}", self.significance.rank_test_verdict());
        let _ = writeln!(out, "  Winner (by overall median): {}", self.winner);
        out
    }
}
