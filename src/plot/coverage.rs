// Coverage over time for the two compared methods, runs interpolated onto a
// uniform grid. Grid points outside every run's time range are not drawn.

use super::{ensure_dir, render_band_chart, BenchmarkCurves, MethodCurve, PlotSummary};
use crate::align::{align, AlignmentMode, TimeSeries};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::loader::{discover_runs, group_runs, load_coverage_points};
use std::path::Path;

/// Interpolated curves of the baseline and treatment methods per benchmark
pub fn coverage_curves(dir: &Path, config: &AnalysisConfig) -> Result<Vec<BenchmarkCurves>> {
    let methods = [&config.baseline_method, &config.treatment_method];
    let mode = AlignmentMode::Interpolate {
        grid_points: config.grid_points,
    };

    let mut result = Vec::new();
    for (benchmark, mut by_method) in group_runs(discover_runs(dir, false, config)?) {
        let mut curves = Vec::new();
        for method in methods {
            let Some(runs) = by_method.remove(method.as_str()) else {
                tracing::warn!("{}: no {} data", benchmark, method);
                continue;
            };
            let series: Vec<TimeSeries> = runs
                .iter()
                .filter_map(|run| match load_coverage_points(&run.path) {
                    Ok(points) => Some(TimeSeries::from_coverage(&points)),
                    Err(e) => {
                        tracing::error!("Error reading \"{}\": {}", run.path.display(), e);
                        None
                    }
                })
                .collect();
            if let Some(aligned) = align(&series, mode) {
                curves.push(MethodCurve {
                    method: method.clone(),
                    series: aligned,
                    annotation: None,
                });
            }
        }
        if !curves.is_empty() {
            result.push(BenchmarkCurves { benchmark, curves });
        }
    }
    Ok(result)
}

/// Write `<bench>_coverage_plot.svg` for every benchmark in `dir`
pub fn plot_coverage(dir: &Path, plot_dir: &Path, config: &AnalysisConfig) -> Result<PlotSummary> {
    ensure_dir(plot_dir)?;
    let mut summary = PlotSummary::default();
    for bench in coverage_curves(dir, config)? {
        tracing::info!(">>> {}", bench.benchmark);
        let path = plot_dir.join(format!("{}_coverage_plot.svg", bench.benchmark));
        render_band_chart(&path, &bench.benchmark, "Sec", "# Distinct Graphs", &bench.curves)?;
        summary.written.push(path);
    }
    Ok(summary)
}
