// Stratified Mann-Whitney U test
//
// Benchmarks differ wildly in difficulty, so pooling all runs would compare
// benchmarks rather than methods. Instead each benchmark (stratum) gets its
// own test; p-values are combined with Fisher's method and U statistics are
// averaged with the stratum sample size as weight.

use super::mann_whitney::{mann_whitney_u, MannWhitneyResult};
use crate::error::{AnalysisError, Result};
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// One measured value tagged with its stratum and group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub stratum: String,
    pub group: String,
    pub value: f64,
}

/// Per-stratum test outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StratumTest {
    pub stratum: String,
    pub first_group: String,
    pub second_group: String,
    pub n1: usize,
    pub n2: usize,
    pub test: MannWhitneyResult,
}

/// Combined outcome across strata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StratifiedTest {
    /// Sample-size weighted average of per-stratum U statistics
    pub weighted_u: f64,
    /// Fisher-combined p-value
    pub combined_p: f64,
    pub strata: Vec<StratumTest>,
    /// Strata without exactly two groups
    pub skipped: Vec<String>,
}

/// Combine independent p-values with Fisher's method
///
/// X = -2 Σ ln p follows χ² with 2k degrees of freedom under the null.
pub fn fisher_combine(pvalues: &[f64]) -> Result<f64> {
    if pvalues.is_empty() {
        return Err(AnalysisError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    let statistic: f64 = -2.0 * pvalues.iter().map(|p| p.ln()).sum::<f64>();
    if statistic.is_infinite() {
        return Ok(0.0);
    }
    let dist = ChiSquared::new(2.0 * pvalues.len() as f64)
        .map_err(|e| AnalysisError::FitFailed(format!("chi-squared: {}", e)))?;
    Ok(dist.sf(statistic))
}

/// Groups of one stratum in order of first appearance
fn groups_in_order<'a>(observations: &[&'a Observation]) -> Vec<&'a str> {
    let mut groups: Vec<&str> = Vec::new();
    for obs in observations {
        if !groups.contains(&obs.group.as_str()) {
            groups.push(&obs.group);
        }
    }
    groups
}

/// Run a two-sided Mann-Whitney U test per stratum and combine the results
///
/// Strata are visited in order of first appearance. Within a stratum, the
/// group seen first is the one whose U is reported. Strata that do not
/// contain exactly two groups are skipped.
pub fn stratified_mann_whitney(observations: &[Observation]) -> Result<StratifiedTest> {
    let mut strata: Vec<&str> = Vec::new();
    for obs in observations {
        if !strata.contains(&obs.stratum.as_str()) {
            strata.push(&obs.stratum);
        }
    }

    let mut tests = Vec::new();
    let mut skipped = Vec::new();
    for stratum in strata {
        let members: Vec<&Observation> = observations
            .iter()
            .filter(|o| o.stratum == stratum)
            .collect();
        let groups = groups_in_order(&members);
        if groups.len() != 2 {
            tracing::debug!(
                "skipping stratum {}: {} groups present",
                stratum,
                groups.len()
            );
            skipped.push(stratum.to_string());
            continue;
        }

        let sample = |group: &str| -> Vec<f64> {
            members
                .iter()
                .filter(|o| o.group == group)
                .map(|o| o.value)
                .collect()
        };
        let x = sample(groups[0]);
        let y = sample(groups[1]);
        let test = mann_whitney_u(&x, &y)?;
        tests.push(StratumTest {
            stratum: stratum.to_string(),
            first_group: groups[0].to_string(),
            second_group: groups[1].to_string(),
            n1: x.len(),
            n2: y.len(),
            test,
        });
    }

    if tests.is_empty() {
        return Err(AnalysisError::NoData(
            "no stratum contains exactly two groups".to_string(),
        ));
    }

    let total_weight: f64 = tests.iter().map(|t| (t.n1 + t.n2) as f64).sum();
    let weighted_u = tests
        .iter()
        .map(|t| t.test.u * (t.n1 + t.n2) as f64)
        .sum::<f64>()
        / total_weight;
    let pvalues: Vec<f64> = tests.iter().map(|t| t.test.pvalue).collect();
    let combined_p = fisher_combine(&pvalues)?;

    Ok(StratifiedTest {
        weighted_u,
        combined_p,
        strata: tests,
        skipped,
    })
}
