// Two-sided Mann-Whitney U test
//
// Method selection:
// - exact null distribution when either sample has at most 8 observations
//   and there are no ties
// - otherwise normal approximation with tie and continuity correction
//
// The reported statistic is U of the first sample.

use crate::error::{AnalysisError, Result};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

/// Largest sample size for which the exact distribution is used
pub const EXACT_MAX_SAMPLE: usize = 8;

/// Result of a two-sided Mann-Whitney U test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MannWhitneyResult {
    /// U statistic of the first sample
    pub u: f64,
    /// Two-sided p-value, clipped to [0, 1]
    pub pvalue: f64,
    /// Exact distribution (true) or normal approximation (false)
    pub exact: bool,
}

/// Average ranks (1-based), ties share the mean of their positions
pub fn rank_average(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // positions i..=j (0-based) share rank mean((i+1)..=(j+1))
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}

/// Sizes of groups of equal values (only groups larger than one)
fn tie_groups(values: &[f64]) -> Vec<usize> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mut groups = Vec::new();
    let mut run = 1;
    for pair in sorted.windows(2) {
        if pair[0] == pair[1] {
            run += 1;
        } else {
            if run > 1 {
                groups.push(run);
            }
            run = 1;
        }
    }
    if run > 1 {
        groups.push(run);
    }
    groups
}

/// Number of orderings yielding each U value for samples of size m and n
///
/// Element `u` of the result counts arrangements with U = u; the sum is
/// C(m + n, m).
fn u_frequencies(m: usize, n: usize) -> Vec<f64> {
    // freq[i][j] is the distribution for sizes (i, j)
    let mut freq: Vec<Vec<Vec<f64>>> = vec![vec![Vec::new(); n + 1]; m + 1];
    for i in 0..=m {
        for j in 0..=n {
            if i == 0 || j == 0 {
                freq[i][j] = vec![1.0];
                continue;
            }
            let mut dist = vec![0.0; i * j + 1];
            // largest element belongs to the first sample: beats all j others
            for (u, count) in freq[i - 1][j].iter().enumerate() {
                dist[u + j] += count;
            }
            // largest element belongs to the second sample
            for (u, count) in freq[i][j - 1].iter().enumerate() {
                dist[u] += count;
            }
            freq[i][j] = dist;
        }
    }
    std::mem::take(&mut freq[m][n])
}

/// P(U >= k) under the null hypothesis, exact
fn exact_sf(k: usize, m: usize, n: usize) -> f64 {
    let freq = u_frequencies(m, n);
    let total: f64 = freq.iter().sum();
    freq.iter().skip(k).sum::<f64>() / total
}

/// Two-sided Mann-Whitney U test of `x` against `y`
///
/// # Example
/// ```
/// use benchstat::hypothesis::mann_whitney_u;
///
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = [6.0, 7.0, 8.0, 9.0, 10.0];
/// let result = mann_whitney_u(&x, &y).unwrap();
/// assert_eq!(result.u, 0.0);
/// assert!(result.pvalue < 0.05);
/// ```
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<MannWhitneyResult> {
    let (n1, n2) = (x.len(), y.len());
    if n1 == 0 || n2 == 0 {
        return Err(AnalysisError::InsufficientData {
            required: 1,
            actual: n1.min(n2),
        });
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(AnalysisError::MalformedLine(
            "Mann-Whitney samples must be finite".to_string(),
        ));
    }

    let combined: Vec<f64> = x.iter().chain(y).copied().collect();
    let ranks = rank_average(&combined);
    let r1: f64 = ranks[..n1].iter().sum();
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u = u1.max(u2);

    let ties = tie_groups(&combined);
    let exact = (n1 <= EXACT_MAX_SAMPLE || n2 <= EXACT_MAX_SAMPLE) && ties.is_empty();

    let pvalue = if exact {
        // no ties: U is integral
        2.0 * exact_sf(u.round() as usize, n1.min(n2), n1.max(n2))
    } else {
        let n = (n1 + n2) as f64;
        let tie_term: f64 = ties
            .iter()
            .map(|&t| {
                let t = t as f64;
                t * t * t - t
            })
            .sum();
        let mu = (n1 * n2) as f64 / 2.0;
        let variance = (n1 * n2) as f64 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
        if variance <= 0.0 {
            // every observation tied
            1.0
        } else {
            let z = (u - mu - 0.5) / variance.sqrt();
            2.0 * Normal::standard().sf(z)
        }
    };

    Ok(MannWhitneyResult {
        u: u1,
        pvalue: pvalue.clamp(0.0, 1.0),
        exact,
    })
}
