// Multi-run time-series alignment
//
// Repeated trials of the same (benchmark, method) pair sample coverage at
// different instants and stop at different times. To draw one averaged
// curve the runs must first be put on a common axis. Two strategies exist:
//
// - Truncate: cut every run to the shortest one and pair samples by index.
//   Cheap, and exact when runs sample at the same iterations.
// - Interpolate: resample every run onto a uniform time grid by linear
//   interpolation; a run contributes nothing outside its own time range.
//
// The two can disagree when run lengths vary a lot. Both are kept as
// distinct modes and each figure picks one explicitly.

mod interpolate;
mod truncate;

pub use interpolate::{align_interpolate, linspace};
pub use truncate::align_truncate;

use crate::record::CoveragePoint;
use serde::Serialize;

/// Default number of grid points for interpolation alignment
pub const DEFAULT_GRID_POINTS: usize = 1000;

/// One trial run: (time, value) samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: Vec<(f64, f64)>,
}

impl TimeSeries {
    pub fn from_points(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// `(SecElapsed, Cover)` samples of a coverage log
    pub fn from_coverage(points: &[CoveragePoint]) -> Self {
        Self {
            points: points
                .iter()
                .map(|p| (p.sec_elapsed, p.cover as f64))
                .collect(),
        }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Latest sample time, `None` for an empty run
    pub fn end_time(&self) -> Option<f64> {
        self.points.iter().map(|p| p.0).reduce(f64::max)
    }
}

/// How runs are put on a common axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlignmentMode {
    /// Truncate to the shortest run, align by sample index
    Truncate,
    /// Resample on a uniform grid of `grid_points` from 0 to the latest end time
    Interpolate { grid_points: usize },
}

impl Default for AlignmentMode {
    fn default() -> Self {
        Self::Interpolate {
            grid_points: DEFAULT_GRID_POINTS,
        }
    }
}

/// Aggregate of all runs at one point of the common axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignedPoint {
    pub time: f64,
    /// `None` when no run covers this point
    pub mean: Option<f64>,
    /// Population standard deviation; 0 with a single contributor
    pub std: Option<f64>,
    pub contributors: usize,
}

/// Averaged curve of a run group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeries {
    pub mode: AlignmentMode,
    pub points: Vec<AlignedPoint>,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(time, mean, std)` of points with at least one contributor
    pub fn present(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| Some((p.time, p.mean?, p.std.unwrap_or(0.0))))
    }

    /// Mean of the last point that has data
    pub fn final_mean(&self) -> Option<f64> {
        self.points.iter().rev().find_map(|p| p.mean)
    }
}

/// Align runs with the given mode; `None` when there is nothing to average
///
/// # Example
/// ```
/// use benchstat::align::{align, AlignmentMode, TimeSeries};
///
/// let runs = vec![
///     TimeSeries::from_points(vec![(1.0, 2.0), (2.0, 4.0)]),
///     TimeSeries::from_points(vec![(1.0, 4.0), (2.0, 6.0), (3.0, 9.0)]),
/// ];
/// let aligned = align(&runs, AlignmentMode::Truncate).unwrap();
/// assert_eq!(aligned.len(), 2);
/// assert_eq!(aligned.points[0].mean, Some(3.0));
/// ```
pub fn align(runs: &[TimeSeries], mode: AlignmentMode) -> Option<AlignedSeries> {
    match mode {
        AlignmentMode::Truncate => align_truncate(runs),
        AlignmentMode::Interpolate { grid_points } => align_interpolate(runs, grid_points),
    }
}

/// Mean and population std of the values observed at one point
///
/// Values are summed in sorted order so the result does not depend on the
/// order of the runs.
fn point_stats(values: &mut [f64]) -> (Option<f64>, Option<f64>) {
    if values.is_empty() {
        return (None, None);
    }
    values.sort_by(f64::total_cmp);
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (Some(mean), Some(0.0));
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (Some(mean), Some(var.sqrt()))
}
