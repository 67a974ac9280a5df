//! Loading benchmark results from output directories
//!
//! Every loader isolates failures per file: a file that cannot be read or
//! parsed is logged and skipped, the rest of the batch still loads.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::record::{is_coverage_header, CoveragePoint, RunName, SummaryRecord};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read a file as text, replacing invalid UTF-8 sequences
pub fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| AnalysisError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// All valid samples of a coverage log, in file order
pub fn load_coverage_points(path: &Path) -> Result<Vec<CoveragePoint>> {
    let text = read_lossy(path)?;
    let mut points = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() || is_coverage_header(line) {
            continue;
        }
        match CoveragePoint::parse_line(line) {
            Ok(point) => points.push(point),
            Err(e) => tracing::debug!("{}: skipping line: {}", path.display(), e),
        }
    }
    Ok(points)
}

/// Last syntactically valid sample of a coverage log
pub fn last_valid_point(path: &Path) -> Result<Option<CoveragePoint>> {
    let text = read_lossy(path)?;
    Ok(text
        .lines()
        .filter(|line| !is_coverage_header(line))
        .filter_map(|line| CoveragePoint::parse_line(line).ok())
        .last())
}

/// `(iter, seconds)` pairs of a paired time file; the first line is a header
pub fn load_time_points(path: &Path) -> Result<Vec<(i64, f64)>> {
    let text = read_lossy(path)?;
    let mut points = Vec::new();
    for line in text.lines().skip(1) {
        let mut fields = line.split(',').map(str::trim);
        let parsed = match (fields.next(), fields.next()) {
            (Some(iter), Some(time)) => iter.parse::<i64>().ok().zip(time.parse::<f64>().ok()),
            _ => None,
        };
        match parsed {
            Some((iter, time)) if time.is_finite() => points.push((iter, time)),
            _ => tracing::debug!("{}: skipping time line: {}", path.display(), line),
        }
    }
    Ok(points)
}

/// A coverage log found on disk
#[derive(Debug, Clone)]
pub struct RunFile {
    pub path: PathBuf,
    pub name: RunName,
    /// Method label after alias mapping
    pub method: String,
}

/// Regular files under `dir`, sorted by path
pub fn list_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AnalysisError::NoData(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).max_depth(max_depth) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => tracing::warn!("error walking {}: {}", dir.display(), e),
        }
    }
    files.sort();
    Ok(files)
}

/// Coverage logs under `dir` that follow the run naming convention
///
/// Paired `-time` files are not returned; look them up with
/// [`RunName::time_file_name`].
pub fn discover_runs(dir: &Path, recursive: bool, config: &AnalysisConfig) -> Result<Vec<RunFile>> {
    let mut runs = Vec::new();
    for path in list_files(dir, recursive)? {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match RunName::parse(file_name) {
            Some(name) if !name.is_time => {
                let method = config.canonical_method(&name.method).to_string();
                runs.push(RunFile { path, name, method });
            }
            Some(_) => {}
            None => tracing::debug!("ignoring {}: not a run file", path.display()),
        }
    }
    Ok(runs)
}

/// Group run files by benchmark, then by method, runs sorted by index
pub fn group_runs(runs: Vec<RunFile>) -> BTreeMap<String, BTreeMap<String, Vec<RunFile>>> {
    let mut groups: BTreeMap<String, BTreeMap<String, Vec<RunFile>>> = BTreeMap::new();
    for run in runs {
        groups
            .entry(run.name.benchmark.clone())
            .or_default()
            .entry(run.method.clone())
            .or_default()
            .push(run);
    }
    for methods in groups.values_mut() {
        for runs in methods.values_mut() {
            runs.sort_by_key(|r| r.name.index);
        }
    }
    groups
}

fn column_index(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|h| h.trim() == *name))
}

fn parse_duration(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite())
}

fn parse_iter(cell: Option<&str>) -> Option<u64> {
    let cell = cell?.trim();
    cell.parse::<u64>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64)
    })
}

/// Load a summary table (`Benchmark,Method|Caption,<duration>[,Iter]`)
///
/// Duration cells that are empty or not numeric become `None` (a run that
/// did not finish). A file without the required columns is an error.
pub fn load_summary_csv(path: &Path, duration_col: &str) -> Result<Vec<SummaryRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| AnalysisError::csv(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| AnalysisError::csv(path, e))?
        .clone();
    let missing = |column: &str| AnalysisError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
    };
    let bench_idx = column_index(&headers, &["Benchmark"]).ok_or_else(|| missing("Benchmark"))?;
    let method_idx =
        column_index(&headers, &["Method", "Caption"]).ok_or_else(|| missing("Method"))?;
    let duration_idx =
        column_index(&headers, &[duration_col]).ok_or_else(|| missing(duration_col))?;
    let iter_idx = column_index(&headers, &["Iter"]);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("{}: skipping malformed row: {}", path.display(), e);
                continue;
            }
        };
        let (Some(benchmark), Some(method)) = (row.get(bench_idx), row.get(method_idx)) else {
            tracing::warn!("{}: skipping short row {:?}", path.display(), row);
            continue;
        };
        records.push(SummaryRecord {
            benchmark: benchmark.trim().to_string(),
            method: method.trim().to_string(),
            duration: parse_duration(row.get(duration_idx)),
            iter: iter_idx.and_then(|i| parse_iter(row.get(i))),
        });
    }
    Ok(records)
}

/// `*.csv` files under `dir`, sorted by path
pub fn list_csv_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    Ok(list_files(dir, recursive)?
        .into_iter()
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("csv"))
        .collect())
}

/// Summary records of every usable file; unusable files are logged and skipped
///
/// Returns the records and the number of files that contributed.
pub fn load_summary_files(paths: &[PathBuf], duration_col: &str) -> (Vec<SummaryRecord>, usize) {
    let mut records = Vec::new();
    let mut usable = 0;
    for path in paths {
        match load_summary_csv(path, duration_col) {
            Ok(mut rows) => {
                tracing::debug!("loaded {} records from {}", rows.len(), path.display());
                usable += 1;
                records.append(&mut rows);
            }
            Err(e) => tracing::warn!("skipping {}: {}", path.display(), e),
        }
    }
    (records, usable)
}

/// Paths matching a glob pattern such as `out/buggy/data/4versions-*.csv`
pub fn glob_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern)
        .map_err(|e| AnalysisError::Config(format!("invalid glob {}: {}", pattern, e)))?;
    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!("glob {}: {}", pattern, e),
        }
    }
    paths.sort();
    Ok(paths)
}
