//! SVG figures built with plotters
//!
//! Every figure is split in two steps: a pure data step that produces the
//! curves or points to draw, and a render step that writes the SVG. Only
//! the data step is unit tested; rendering needs a system font.

pub mod coverage;
pub mod coverage_time;
pub mod errorbar;

pub use coverage::{coverage_curves, plot_coverage};
pub use coverage_time::{coverage_time_curves, load_verified_totals, percentage_label, plot_coverage_time};
pub use errorbar::{errorbar_points, families, plot_errorbars, ErrorBarPoint};

use crate::align::AlignedSeries;
use crate::error::{AnalysisError, Result};
use plotters::prelude::*;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Aligned curve of one method, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCurve {
    pub method: String,
    pub series: AlignedSeries,
    /// Text appended to the legend entry
    pub annotation: Option<String>,
}

/// Curves of every method of one benchmark
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkCurves {
    pub benchmark: String,
    pub curves: Vec<MethodCurve>,
}

/// Files written and benchmarks skipped by one plot command
#[derive(Debug, Default)]
pub struct PlotSummary {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<String>,
}

impl PlotSummary {
    pub fn to_report_string(&self) -> String {
        let mut report = format!("Plots written: {}\n", self.written.len());
        for path in &self.written {
            report.push_str(&format!("  {}\n", path.display()));
        }
        if !self.skipped.is_empty() {
            report.push_str(&format!("Skipped: {}\n", self.skipped.join(", ")));
        }
        report
    }
}

/// Color of the `index`-th method: blue, red, then the plotters palette
pub(crate) fn method_color(index: usize) -> RGBColor {
    match index {
        0 => BLUE,
        1 => RED,
        n => {
            let c = Palette99::pick(n).to_rgba();
            RGBColor(c.0, c.1, c.2)
        }
    }
}

pub(crate) fn plot_err(e: impl Display) -> AnalysisError {
    AnalysisError::Plot(e.to_string())
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| AnalysisError::io(dir, e))
}

/// Draw mean curves with a ±std band for every method
pub(crate) fn render_band_chart(
    path: &Path,
    title: &str,
    x_label: &str,
    y_label: &str,
    curves: &[MethodCurve],
) -> Result<()> {
    let (mut x_max, mut y_max) = (0.0f64, 0.0f64);
    for curve in curves {
        for (t, mean, std) in curve.series.present() {
            x_max = x_max.max(t);
            y_max = y_max.max(mean + std);
        }
    }
    let x_max = if x_max > 0.0 { x_max * 1.02 } else { 1.0 };
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("serif", 40).into_font())
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .light_line_style(WHITE)
        .x_desc(x_label)
        .y_desc(y_label)
        .x_label_formatter(&|x| format!("{:.0}", x))
        .draw()
        .map_err(plot_err)?;

    for (idx, curve) in curves.iter().enumerate() {
        let color = method_color(idx);
        let points: Vec<(f64, f64, f64)> = curve.series.present().collect();
        if points.is_empty() {
            continue;
        }

        let mut band: Vec<(f64, f64)> = points.iter().map(|&(t, m, s)| (t, m + s)).collect();
        band.extend(points.iter().rev().map(|&(t, m, s)| (t, (m - s).max(0.0))));
        chart
            .draw_series(std::iter::once(Polygon::new(band, color.mix(0.2).filled())))
            .map_err(plot_err)?;

        let label = match &curve.annotation {
            Some(note) => format!("{} {}", curve.method, note),
            None => curve.method.clone(),
        };
        chart
            .draw_series(LineSeries::new(
                points.iter().map(|&(t, m, _)| (t, m)),
                color.stroke_width(2),
            ))
            .map_err(plot_err)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    tracing::info!("Plot saved as \"{}\"", path.display());
    Ok(())
}
