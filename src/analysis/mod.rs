//! Two-method comparisons across benchmarks
//!
//! - [`coverage`]: coverage rate (states per second) with a stratified
//!   Mann-Whitney U test
//! - [`survival`]: time to completion with a stratified Cox model

pub mod coverage;
pub mod survival;

pub use coverage::{
    compare_coverage_rates, coverage_rate, load_coverage_rates, load_rate_table,
    CoverageComparison, CoverageRate, MedianRow,
};
pub use survival::{
    compare_durations, survival_observations, BenchmarkOutcome, DurationComparison, FitOutcome,
};

use crate::error::Result;
use serde::Serialize;

/// A comparison result printable as text or JSON
pub trait Report: Serialize {
    /// Human-readable report
    fn to_report_string(&self) -> String;

    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
