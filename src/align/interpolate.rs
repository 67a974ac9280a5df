// Interpolation alignment: resample every run onto a uniform time grid

use super::{point_stats, AlignedPoint, AlignedSeries, AlignmentMode, TimeSeries};

/// `n` evenly spaced values from `start` to `stop` inclusive
///
/// The last value is exactly `stop`; `n == 1` yields `[start]`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        stop
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// Linear interpolation of time-sorted samples at `t`
///
/// `None` outside `[first time, last time]`; samples sharing a time stamp
/// resolve to the earlier one.
fn interpolate_at(points: &[(f64, f64)], t: f64) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    if t < first.0 || t > last.0 {
        return None;
    }

    let hi = points.partition_point(|p| p.0 < t);
    if hi == 0 {
        return Some(first.1);
    }
    let (t0, c0) = points[hi - 1];
    let (t1, c1) = points[hi];
    if t1 > t0 {
        Some(c0 + (c1 - c0) * (t - t0) / (t1 - t0))
    } else {
        Some(c0)
    }
}

/// Resample runs on `grid_points` evenly spaced times from 0 to the latest
/// end time and average the runs that cover each grid point
///
/// Returns `None` when no run has samples or `grid_points` is 0.
pub fn align_interpolate(runs: &[TimeSeries], grid_points: usize) -> Option<AlignedSeries> {
    if grid_points == 0 {
        return None;
    }

    let sorted: Vec<Vec<(f64, f64)>> = runs
        .iter()
        .filter(|r| !r.is_empty())
        .map(|r| {
            let mut points = r.points().to_vec();
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            points
        })
        .collect();

    let max_end = sorted
        .iter()
        .filter_map(|points| points.last().map(|p| p.0))
        .reduce(f64::max)?;

    let mut values = Vec::with_capacity(sorted.len());
    let points = linspace(0.0, max_end, grid_points)
        .into_iter()
        .map(|t| {
            values.clear();
            values.extend(sorted.iter().filter_map(|run| interpolate_at(run, t)));
            let contributors = values.len();
            let (mean, std) = point_stats(&mut values);
            AlignedPoint {
                time: t,
                mean,
                std,
                contributors,
            }
        })
        .collect();

    Some(AlignedSeries {
        mode: AlignmentMode::Interpolate { grid_points },
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_endpoints() {
        let grid = linspace(0.0, 3.0, 4);
        assert_eq!(grid, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(linspace(0.0, 3.0, 1), vec![0.0]);
        assert!(linspace(0.0, 3.0, 0).is_empty());
    }

    #[test]
    fn test_interpolate_inside_range() {
        let points = [(1.0, 0.0), (3.0, 10.0)];
        assert_eq!(interpolate_at(&points, 2.0), Some(5.0));
        assert_eq!(interpolate_at(&points, 1.0), Some(0.0));
        assert_eq!(interpolate_at(&points, 3.0), Some(10.0));
    }

    #[test]
    fn test_interpolate_outside_range_is_missing() {
        let points = [(1.0, 0.0), (3.0, 10.0)];
        assert_eq!(interpolate_at(&points, 0.5), None);
        assert_eq!(interpolate_at(&points, 3.5), None);
        assert_eq!(interpolate_at(&[], 1.0), None);
    }

    #[test]
    fn test_interpolate_duplicate_times() {
        let points = [(1.0, 2.0), (2.0, 4.0), (2.0, 8.0), (3.0, 8.0)];
        assert_eq!(interpolate_at(&points, 1.5), Some(3.0));
        assert_eq!(interpolate_at(&points, 2.5), Some(8.0));
    }
}
