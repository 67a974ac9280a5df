// Mean ± sample std of durations per benchmark parameter, one figure per
// benchmark family (`family(N)` names)

use super::{ensure_dir, method_color, plot_err, PlotSummary};
use crate::config::AnalysisConfig;
use crate::descriptive::{mean, sample_std};
use crate::error::Result;
use crate::record::{split_family, SummaryRecord};
use plotters::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Horizontal offset between the methods drawn at one parameter
const METHOD_OFFSET: f64 = 0.1;

/// One error bar: durations of `family(param)` for one method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBarPoint {
    pub param: u32,
    pub method: String,
    pub mean: f64,
    /// `None` with a single run
    pub std: Option<f64>,
    pub runs: usize,
}

/// Every family of parameterized benchmark names, sorted
pub fn families(records: &[SummaryRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| split_family(&r.benchmark).map(|(family, _)| family.to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Error bars of `family` for each configured parameter and method
///
/// The first `max_runs` records of each benchmark are taken in file order,
/// then records without a duration are dropped.
pub fn errorbar_points(
    records: &[SummaryRecord],
    family: &str,
    methods: &[&str],
    config: &AnalysisConfig,
) -> Vec<ErrorBarPoint> {
    let mut points = Vec::new();
    for param in config.param_min..=config.param_max {
        let benchmark = format!("{}({})", family, param);
        for method in methods {
            let durations: Vec<f64> = records
                .iter()
                .filter(|r| r.benchmark == benchmark && r.method == *method)
                .take(config.max_runs)
                .filter_map(|r| r.duration)
                .collect();
            if let Some(mean) = mean(&durations) {
                points.push(ErrorBarPoint {
                    param,
                    method: method.to_string(),
                    mean,
                    std: sample_std(&durations),
                    runs: durations.len(),
                });
            }
        }
    }
    points
}

fn render_errorbars(
    path: &Path,
    family: &str,
    methods: &[&str],
    points: &[ErrorBarPoint],
    config: &AnalysisConfig,
) -> Result<()> {
    let y_max = points
        .iter()
        .map(|p| p.mean + p.std.unwrap_or(0.0))
        .fold(0.0f64, f64::max);
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };
    let x_range = (config.param_min as f64 - 0.5)..(config.param_max as f64 + 0.5);

    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(family, ("serif", 40).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, -y_max * 0.1..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels((config.param_max - config.param_min + 1) as usize)
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_desc("Sec")
        .draw()
        .map_err(plot_err)?;

    for (idx, method) in methods.iter().enumerate() {
        let color = method_color(idx);
        let offset = if idx == 0 { -METHOD_OFFSET } else { METHOD_OFFSET * idx as f64 };
        let ours: Vec<&ErrorBarPoint> = points.iter().filter(|p| p.method == *method).collect();

        chart
            .draw_series(ours.iter().filter_map(|p| {
                let std = p.std?;
                Some(ErrorBar::new_vertical(
                    p.param as f64 + offset,
                    p.mean - std,
                    p.mean,
                    p.mean + std,
                    color.filled(),
                    16,
                ))
            }))
            .map_err(plot_err)?;

        chart
            .draw_series(
                ours.iter()
                    .map(|p| Circle::new((p.param as f64 + offset, p.mean), 5, color.filled())),
            )
            .map_err(plot_err)?
            .label(method.to_string())
            .legend(move |(x, y)| Circle::new((x + 10, y), 5, color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    tracing::info!("Plot saved as \"{}\"", path.display());
    Ok(())
}

/// Write `<family>.svg` for each family that has data for a compared method
///
/// `only` restricts the families drawn; by default every family found in
/// `records` is drawn.
pub fn plot_errorbars(
    records: &[SummaryRecord],
    only: &[String],
    plot_dir: &Path,
    config: &AnalysisConfig,
) -> Result<PlotSummary> {
    ensure_dir(plot_dir)?;
    let methods = [
        config.baseline_method.as_str(),
        config.treatment_method.as_str(),
    ];
    let selected = if only.is_empty() {
        families(records)
    } else {
        only.to_vec()
    };

    let mut summary = PlotSummary::default();
    for family in selected {
        let points = errorbar_points(records, &family, &methods, config);
        if points.is_empty() {
            tracing::warn!("{}: no data for {} or {}", family, methods[0], methods[1]);
            summary.skipped.push(family);
            continue;
        }
        let path = plot_dir.join(format!("{}.svg", family));
        render_errorbars(&path, &family, &methods, &points, config)?;
        summary.written.push(path);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(benchmark: &str, method: &str, duration: Option<f64>) -> SummaryRecord {
        SummaryRecord {
            benchmark: benchmark.to_string(),
            method: method.to_string(),
            duration,
            iter: None,
        }
    }

    #[test]
    fn test_families_sorted_and_unique() {
        let records = vec![
            record("ms-queue(3)", "Random", Some(1.0)),
            record("dglm-queue(4)", "Random", Some(1.0)),
            record("ms-queue(5)", "3phstar", Some(1.0)),
            record("CS-account", "Random", Some(1.0)),
        ];
        assert_eq!(families(&records), vec!["dglm-queue", "ms-queue"]);
    }

    #[test]
    fn test_points_mean_and_sample_std() {
        let records = vec![
            record("mp(3)", "Random", Some(1.0)),
            record("mp(3)", "Random", Some(3.0)),
            record("mp(3)", "Random", None),
            record("mp(3)", "3phstar", Some(2.0)),
            record("mp(9)", "Random", Some(100.0)),
        ];
        let config = AnalysisConfig::default();
        let points = errorbar_points(&records, "mp", &["Random", "3phstar"], &config);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].mean, 2.0);
        assert!((points[0].std.unwrap() - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(points[0].runs, 2);
        assert_eq!(points[1].method, "3phstar");
        assert_eq!(points[1].std, None);
    }

    #[test]
    fn test_points_take_first_max_runs_before_dropping_missing() {
        let mut records = vec![record("mp(4)", "Random", None)];
        records.extend((0..5).map(|i| record("mp(4)", "Random", Some(i as f64))));
        let config = AnalysisConfig {
            max_runs: 3,
            ..AnalysisConfig::default()
        };
        let points = errorbar_points(&records, "mp", &["Random"], &config);
        assert_eq!(points[0].runs, 2);
        assert_eq!(points[0].mean, 0.5);
    }

    #[test]
    fn test_family_without_data_is_skipped() {
        let dir = tempfile::TempDir::new().unwrap();
        let records = vec![record("mp(3)", "GenMC", Some(1.0))];
        let summary = plot_errorbars(
            &records,
            &["mp".to_string()],
            dir.path(),
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert!(summary.written.is_empty());
        assert_eq!(summary.skipped, vec!["mp".to_string()]);
    }
}
