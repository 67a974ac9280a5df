//! Descriptive statistics over `f64` samples
//!
//! Population standard deviation (ddof = 0) is used for aligned curves,
//! sample standard deviation (ddof = 1) for per-run durations in tables and
//! error bars.

/// Arithmetic mean, `None` for an empty sample
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sum_squared_deviation(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum()
}

/// Population standard deviation, `None` for an empty sample
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    Some((sum_squared_deviation(values, m) / values.len() as f64).sqrt())
}

/// Sample standard deviation, `None` below two observations
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    Some((sum_squared_deviation(values, m) / (values.len() - 1) as f64).sqrt())
}

/// Median (average of the middle pair for even lengths)
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
