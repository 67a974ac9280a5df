// Coverage over time per benchmark, runs aligned by truncation
//
// When a run has a paired `-time` file, its timestamps replace the log's
// SecElapsed column: samples are joined on Iter after prepending (0, 0.0).

use super::{ensure_dir, render_band_chart, BenchmarkCurves, MethodCurve, PlotSummary};
use crate::align::{align, AlignmentMode, TimeSeries};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::loader::{discover_runs, group_runs, load_coverage_points, load_time_points, RunFile};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Verified total of distinct graphs per benchmark (`Benchmark,Iter`)
///
/// A missing or non-numeric `Iter` cell maps to `None`.
pub fn load_verified_totals(path: &Path) -> Result<BTreeMap<String, Option<f64>>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| AnalysisError::csv(path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| AnalysisError::csv(path, e))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| AnalysisError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
    };
    let (bench_col, iter_col) = (column("Benchmark")?, column("Iter")?);

    let mut totals = BTreeMap::new();
    for row in reader.records() {
        let row = row.map_err(|e| AnalysisError::csv(path, e))?;
        let Some(benchmark) = row.get(bench_col) else {
            continue;
        };
        let total = row
            .get(iter_col)
            .and_then(|c| c.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0);
        // first row wins, like a lookup of the first match
        totals.entry(benchmark.trim().to_string()).or_insert(total);
    }
    Ok(totals)
}

/// `"12.34%"` of the verified total, `"-%"` when there is none
pub fn percentage_label(final_mean: f64, total: Option<f64>) -> String {
    match total {
        Some(total) => format!("{:.2}%", final_mean / total.trunc() * 100.0),
        None => "-%".to_string(),
    }
}

/// Time series of one run, using its paired time file when present
fn run_series(run: &RunFile) -> Result<TimeSeries> {
    let points = load_coverage_points(&run.path)?;
    let time_path = run.path.with_file_name(run.name.time_file_name());
    if !time_path.is_file() {
        return Ok(TimeSeries::from_coverage(&points));
    }

    let mut times = vec![(0i64, 0.0f64)];
    times.extend(load_time_points(&time_path)?);
    let len = points.len().min(times.len());
    let by_iter: HashMap<i64, f64> = times[..len].iter().copied().collect();

    Ok(TimeSeries::from_points(
        points[..len]
            .iter()
            .filter_map(|p| by_iter.get(&p.iter).map(|t| (*t, p.cover as f64)))
            .collect(),
    ))
}

/// Truncation-aligned curves per benchmark and method found in `dir`
pub fn coverage_time_curves(
    dir: &Path,
    verified: &BTreeMap<String, Option<f64>>,
    config: &AnalysisConfig,
) -> Result<Vec<BenchmarkCurves>> {
    let groups = group_runs(discover_runs(dir, false, config)?);
    tracing::info!("benchmarks found: {}", groups.len());

    let mut result = Vec::new();
    for (benchmark, methods) in groups {
        tracing::info!("Processing {}", benchmark);
        let total = verified.get(&benchmark).copied().flatten();
        let mut curves = Vec::new();
        for (method, runs) in methods {
            let series: Vec<TimeSeries> = runs
                .iter()
                .filter_map(|run| match run_series(run) {
                    Ok(series) => Some(series),
                    Err(e) => {
                        tracing::error!("Error processing {}: {}", run.path.display(), e);
                        None
                    }
                })
                .collect();

            let Some(aligned) = align(&series, AlignmentMode::Truncate) else {
                tracing::warn!("No valid data for {}-{}", benchmark, method);
                continue;
            };
            let annotation = (!verified.is_empty())
                .then(|| aligned.final_mean().map(|m| percentage_label(m, total)))
                .flatten();
            curves.push(MethodCurve {
                method,
                series: aligned,
                annotation,
            });
        }
        result.push(BenchmarkCurves { benchmark, curves });
    }
    Ok(result)
}

/// Write `<bench>_coverage_time_plot.svg` for every benchmark in `dir`
pub fn plot_coverage_time(
    dir: &Path,
    plot_dir: &Path,
    verify: Option<&Path>,
    config: &AnalysisConfig,
) -> Result<PlotSummary> {
    let verified = match verify {
        Some(path) => load_verified_totals(path)?,
        None => BTreeMap::new(),
    };
    ensure_dir(plot_dir)?;

    let mut summary = PlotSummary::default();
    for bench in coverage_time_curves(dir, &verified, config)? {
        if bench.curves.is_empty() {
            tracing::warn!("No valid data found for {}", bench.benchmark);
            summary.skipped.push(bench.benchmark);
            continue;
        }
        let path = plot_dir.join(format!("{}_coverage_time_plot.svg", bench.benchmark));
        render_band_chart(
            &path,
            &bench.benchmark,
            "Time (seconds)",
            "# Distinct Graphs",
            &bench.curves,
        )?;
        summary.written.push(path);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_percentage_label() {
        assert_eq!(percentage_label(50.0, Some(200.0)), "25.00%");
        assert_eq!(percentage_label(50.0, None), "-%");
    }

    #[test]
    fn test_load_verified_totals() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("verify.csv");
        fs::write(&path, "Benchmark,Iter,Sec\nmp(5),200,1.0\nsb,,2.0\nmp(5),300,1.0\n").unwrap();
        let totals = load_verified_totals(&path).unwrap();
        assert_eq!(totals["mp(5)"], Some(200.0));
        assert_eq!(totals["sb"], None);
    }

    #[test]
    fn test_verify_file_needs_iter_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("verify.csv");
        fs::write(&path, "Benchmark,Sec\nmp(5),1.0\n").unwrap();
        assert!(matches!(
            load_verified_totals(&path),
            Err(AnalysisError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_curves_truncate_to_shortest_run() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("mp(5)-rand-0"),
            "Iter,Cover,SecElapsed\n1,1,1.0\n2,2,2.0\n3,3,3.0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("mp(5)-rand-1"),
            "Iter,Cover,SecElapsed\n1,3,1.0\n2,4,2.0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("mp(5)-fuzz-0"),
            "Iter,Cover,SecElapsed\n1,5,0.5\n",
        )
        .unwrap();

        let mut verified = BTreeMap::new();
        verified.insert("mp(5)".to_string(), Some(10.0));
        let curves =
            coverage_time_curves(dir.path(), &verified, &AnalysisConfig::default()).unwrap();
        assert_eq!(curves.len(), 1);
        let bench = &curves[0];
        assert_eq!(bench.curves.len(), 2);

        let random = bench.curves.iter().find(|c| c.method == "Random").unwrap();
        assert_eq!(random.series.len(), 2);
        assert_eq!(random.series.points[1].mean, Some(3.0));
        assert_eq!(random.series.points[1].std, Some(1.0));
        assert_eq!(random.annotation.as_deref(), Some("30.00%"));
    }

    #[test]
    fn test_paired_time_file_replaces_elapsed_seconds() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("sb-fuzz-0"),
            "Iter,Cover,SecElapsed\n0,0,0.1\n1,2,0.2\n2,4,0.3\n",
        )
        .unwrap();
        fs::write(dir.path().join("sb-fuzz-0-time"), "Iter,Sec\n1,10.0\n2,20.0\n").unwrap();

        let curves =
            coverage_time_curves(dir.path(), &BTreeMap::new(), &AnalysisConfig::default())
                .unwrap();
        let curve = &curves[0].curves[0];
        let times: Vec<f64> = curve.series.points.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 10.0, 20.0]);
        assert!(curve.annotation.is_none());
    }
}
