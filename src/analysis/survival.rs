//! Time-to-completion comparison between two methods
//!
//! Durations come from summary tables. A run whose iteration count reached
//! the cap is treated as right-censored; tables without an `Iter` column mark
//! every run as completed. Methods are coded 0 (`m1`) and 1 (`m2`) and a Cox
//! model stratified by benchmark estimates the shared effect.

use super::Report;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::hypothesis::{fit_stratified_cox, CoxFit, Significance, SurvivalObservation};
use crate::record::SummaryRecord;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Convert summary rows of `m1` and `m2` into survival observations
///
/// Rows of other methods and rows without a usable duration are dropped.
pub fn survival_observations(
    records: &[SummaryRecord],
    m1: &str,
    m2: &str,
    iteration_cap: u64,
) -> Vec<SurvivalObservation> {
    records
        .iter()
        .filter_map(|r| {
            let covariate = if r.method == m1 {
                0.0
            } else if r.method == m2 {
                1.0
            } else {
                return None;
            };
            let duration = r.completed_duration()?;
            Some(SurvivalObservation {
                stratum: r.benchmark.clone(),
                duration,
                event: r.iter.map_or(true, |iter| iter < iteration_cap),
                covariate,
            })
        })
        .collect()
}

/// Result of one Cox fit, or why it was not possible
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FitOutcome {
    Fitted {
        fit: CoxFit,
        significance: Significance,
        /// Method that completes sooner according to the sign of z
        faster: String,
    },
    Skipped {
        reason: String,
    },
}

impl FitOutcome {
    fn from_fit(result: Result<CoxFit>, m1: &str, m2: &str, config: &AnalysisConfig) -> Self {
        match result {
            Ok(fit) => FitOutcome::Fitted {
                significance: Significance::classify(fit.pvalue, config),
                faster: if fit.z > 0.0 { m2 } else { m1 }.to_string(),
                fit,
            },
            Err(e) => FitOutcome::Skipped {
                reason: e.to_string(),
            },
        }
    }

    pub fn fit(&self) -> Option<&CoxFit> {
        match self {
            FitOutcome::Fitted { fit, .. } => Some(fit),
            FitOutcome::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkOutcome {
    pub benchmark: String,
    pub outcome: FitOutcome,
}

/// Outcome of a duration comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationComparison {
    pub source: String,
    pub first_method: String,
    pub second_method: String,
    pub observations: usize,
    pub censored: usize,
    pub overall: FitOutcome,
    pub by_benchmark: Vec<BenchmarkOutcome>,
}

/// Compare durations of `m1` and `m2` with a stratified Cox model
///
/// Fails with [`AnalysisError::NoData`] when neither method has a usable
/// row. A model that cannot be fitted is reported as skipped, not as an
/// error. With `by_benchmark`, every benchmark carrying both methods also
/// gets its own unstratified fit.
pub fn compare_durations(
    source: &str,
    records: &[SummaryRecord],
    m1: &str,
    m2: &str,
    config: &AnalysisConfig,
    by_benchmark: bool,
) -> Result<DurationComparison> {
    let observations = survival_observations(records, m1, m2, config.iteration_cap);
    if observations.is_empty() {
        return Err(AnalysisError::NoData(format!(
            "No records for methods {} and {} under {}",
            m1, m2, source
        )));
    }
    let censored = observations.iter().filter(|o| !o.event).count();
    tracing::info!(
        observations = observations.len(),
        censored,
        "fitting stratified Cox model"
    );

    let overall = FitOutcome::from_fit(fit_stratified_cox(&observations), m1, m2, config);

    let mut per_benchmark = Vec::new();
    if by_benchmark {
        let benchmarks: BTreeSet<&str> =
            observations.iter().map(|o| o.stratum.as_str()).collect();
        for benchmark in benchmarks {
            let subset: Vec<SurvivalObservation> = observations
                .iter()
                .filter(|o| o.stratum == benchmark)
                .cloned()
                .collect();
            let has_both = subset.iter().any(|o| o.covariate == 0.0)
                && subset.iter().any(|o| o.covariate == 1.0);
            if !has_both {
                continue;
            }
            let outcome = FitOutcome::from_fit(fit_stratified_cox(&subset), m1, m2, config);
            if let FitOutcome::Skipped { reason } = &outcome {
                tracing::debug!("{}: {}", benchmark, reason);
            }
            per_benchmark.push(BenchmarkOutcome {
                benchmark: benchmark.to_string(),
                outcome,
            });
        }
    }

    Ok(DurationComparison {
        source: source.to_string(),
        first_method: m1.to_string(),
        second_method: m2.to_string(),
        observations: observations.len(),
        censored,
        overall,
        by_benchmark: per_benchmark,
    })
}

impl Report for DurationComparison {
    fn to_report_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Stratified Cox model: {} (0) vs {} (1) by Benchmark",
            self.first_method, self.second_method
        );
        let _ = writeln!(
            out,
            "Runs: {}  Censored: {}  Source: {}",
            self.observations, self.censored, self.source
        );

        match &self.overall {
            FitOutcome::Fitted {
                fit,
                significance,
                faster,
            } => {
                let _ = writeln!(
                    out,
                    "Z: {:.4}  P: {:.6e}  HR: {:.4}",
                    fit.z, fit.pvalue, fit.hazard_ratio
                );
                let _ = writeln!(
                    out,
                    "Significance: {}",
                    if significance.is_significant() {
                        format!("significant ({})", significance.stars())
                    } else {
                        "not significant".to_string()
                    }
                );
                let _ = writeln!(out, "Faster: {}", faster);
            }
            FitOutcome::Skipped { reason } => {
                let _ = writeln!(out, "Model not fitted: {}", reason);
            }
        }

        if !self.by_benchmark.is_empty() {
            let _ = writeln!(out, "\nPer-benchmark:");
            for row in &self.by_benchmark {
                match &row.outcome {
                    FitOutcome::Fitted { fit, .. } => {
                        let _ = writeln!(
                            out,
                            "  {}: Z={:.3}  P={:.3e}",
                            row.benchmark, fit.z, fit.pvalue
                        );
                    }
                    FitOutcome::Skipped { reason } => {
                        let _ = writeln!(out, "  {}: skipped ({})", row.benchmark, reason);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(benchmark: &str, method: &str, duration: f64, iter: Option<u64>) -> SummaryRecord {
        SummaryRecord {
            benchmark: benchmark.to_string(),
            method: method.to_string(),
            duration: Some(duration),
            iter,
        }
    }

    /// `m2` takes half as long as `m1` on every run
    fn halved(benchmarks: &[(&str, f64)]) -> Vec<SummaryRecord> {
        let mut rows = Vec::new();
        for &(bench, scale) in benchmarks {
            for k in 1..=10 {
                rows.push(record(bench, "Random", 2.0 * k as f64 * scale, None));
                rows.push(record(bench, "3phstar", k as f64 * scale, None));
            }
        }
        rows
    }

    #[test]
    fn test_observations_code_methods_and_censor_at_cap() {
        let rows = vec![
            record("a", "Random", 1.0, Some(10)),
            record("a", "3phstar", 2.0, Some(100)),
            record("a", "GenMC", 3.0, None),
            record("a", "Random", -1.0, None),
            SummaryRecord {
                benchmark: "a".to_string(),
                method: "3phstar".to_string(),
                duration: None,
                iter: None,
            },
        ];
        let obs = survival_observations(&rows, "Random", "3phstar", 100);
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].covariate, 0.0);
        assert!(obs[0].event);
        assert_eq!(obs[1].covariate, 1.0);
        assert!(!obs[1].event);
    }

    #[test]
    fn test_faster_second_method_detected() {
        let config = AnalysisConfig::default();
        let rows = halved(&[("a", 1.0), ("b", 3.0), ("c", 0.5)]);
        let result = compare_durations("test", &rows, "Random", "3phstar", &config, true).unwrap();

        let FitOutcome::Fitted {
            fit,
            significance,
            faster,
        } = &result.overall
        else {
            panic!("expected a fit");
        };
        assert!((fit.z - 4.164784).abs() < 1e-4);
        assert_eq!(faster, "3phstar");
        assert!(significance.is_significant());
        assert_eq!(result.by_benchmark.len(), 3);
        assert!(result.by_benchmark.iter().all(|b| b.outcome.fit().is_some()));

        let report = result.to_report_string();
        assert!(report.contains("Faster: 3phstar"));
        assert!(report.contains("Per-benchmark:"));
        assert!(report.contains("  a: Z=2.40"));
    }

    #[test]
    fn test_swapped_methods_flip_direction() {
        let config = AnalysisConfig::default();
        let rows = halved(&[("a", 1.0)]);
        let result = compare_durations("test", &rows, "3phstar", "Random", &config, false).unwrap();
        let fit = result.overall.fit().unwrap();
        assert!(fit.z < 0.0);
        assert!(matches!(
            &result.overall,
            FitOutcome::Fitted { faster, .. } if faster == "3phstar"
        ));
        assert!(result.by_benchmark.is_empty());
    }

    #[test]
    fn test_unfittable_model_is_skipped() {
        let config = AnalysisConfig::default();
        let rows = vec![
            record("a", "Random", 1.0, None),
            record("a", "Random", 2.0, None),
        ];
        let result = compare_durations("test", &rows, "Random", "3phstar", &config, true).unwrap();
        assert!(matches!(result.overall, FitOutcome::Skipped { .. }));
        assert!(result.by_benchmark.is_empty());
        assert!(result.to_report_string().contains("Model not fitted"));
    }

    #[test]
    fn test_no_records_is_an_error() {
        let config = AnalysisConfig::default();
        let rows = vec![record("a", "GenMC", 1.0, None)];
        let err = compare_durations("out/", &rows, "Random", "3phstar", &config, false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No data: No records for methods Random and 3phstar under out/"
        );
    }

    #[test]
    fn test_json_tags_outcome() {
        let config = AnalysisConfig::default();
        let rows = halved(&[("a", 1.0)]);
        let result = compare_durations("test", &rows, "Random", "3phstar", &config, false).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["overall"]["status"], "fitted");
        assert_eq!(json["overall"]["faster"], "3phstar");
    }
}
