// Truncation alignment: pair samples by index up to the shortest run

use super::{point_stats, AlignedPoint, AlignedSeries, AlignmentMode, TimeSeries};

/// Truncate all runs to the shortest length and average index by index
///
/// Time is averaged across runs as well as the value. Returns `None` for an
/// empty run list or when the shortest run has no samples.
pub fn align_truncate(runs: &[TimeSeries]) -> Option<AlignedSeries> {
    let min_len = runs.iter().map(TimeSeries::len).min()?;
    if min_len == 0 {
        return None;
    }

    let mut points = Vec::with_capacity(min_len);
    let mut times = Vec::with_capacity(runs.len());
    let mut values = Vec::with_capacity(runs.len());

    for i in 0..min_len {
        times.clear();
        values.clear();
        for run in runs {
            let (t, v) = run.points()[i];
            times.push(t);
            values.push(v);
        }
        let (time, _) = point_stats(&mut times);
        let (mean, std) = point_stats(&mut values);
        points.push(AlignedPoint {
            time: time.unwrap_or(0.0),
            mean,
            std,
            contributors: runs.len(),
        });
    }

    Some(AlignedSeries {
        mode: AlignmentMode::Truncate,
        points,
    })
}
