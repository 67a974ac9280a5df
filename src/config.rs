//! Analysis configuration
//!
//! Every threshold used by the comparators and figures lives here instead of
//! being scattered across subcommands. Values can be overridden from a TOML
//! file passed with `--config`; missing keys keep their defaults.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Iteration count at which the external tool gives up on a run.
pub const DEFAULT_ITERATION_CAP: u64 = 1_000_000_000;

/// Configuration shared by all analyses
///
/// # Example
/// ```
/// use benchstat::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.significance_level, 0.05);
/// assert_eq!(config.grid_points, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// p below this is "significant" (`*`)
    pub significance_level: f64,

    /// p below this is "highly significant" (`**`)
    pub high_significance_level: f64,

    /// p below this earns `***` in survival reports
    pub very_high_significance_level: f64,

    /// Number of points on the uniform grid used by interpolation alignment
    pub grid_points: usize,

    /// Runs whose `Iter` reaches this value are censored in survival analysis
    pub iteration_cap: u64,

    /// Only the first `max_runs` records per (benchmark, method) are used
    /// by the error-bar figure and the ranked table
    pub max_runs: usize,

    /// Baseline method (group 0 in survival analysis)
    pub baseline_method: String,

    /// Treatment method (group 1 in survival analysis)
    pub treatment_method: String,

    /// Method segment in run file names → method label
    ///
    /// The external tool writes `<bench>-rand-<n>` and `<bench>-fuzz-<n>`
    /// while summary CSVs use `Random` and `3phstar`.
    pub method_aliases: BTreeMap<String, String>,

    /// First benchmark parameter plotted by the error-bar figure
    pub param_min: u32,

    /// Last benchmark parameter (inclusive) plotted by the error-bar figure
    pub param_max: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let mut method_aliases = BTreeMap::new();
        method_aliases.insert("rand".to_string(), "Random".to_string());
        method_aliases.insert("fuzz".to_string(), "3phstar".to_string());

        Self {
            significance_level: 0.05,
            high_significance_level: 0.01,
            very_high_significance_level: 0.001,
            grid_points: 1000,
            iteration_cap: DEFAULT_ITERATION_CAP,
            max_runs: 30,
            baseline_method: "Random".to_string(),
            treatment_method: "3phstar".to_string(),
            method_aliases,
            param_min: 3,
            param_max: 8,
        }
    }
}

impl AnalysisConfig {
    /// Stricter significance thresholds (99% / 99.9% / 99.99%)
    pub fn strict() -> Self {
        Self {
            significance_level: 0.01,
            high_significance_level: 0.001,
            very_high_significance_level: 0.0001,
            ..Self::default()
        }
    }

    /// Load a configuration from a TOML file and validate it
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        Self::from_toml(&text)
    }

    /// Parse a configuration from TOML text and validate it
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate().map_err(AnalysisError::Config)?;
        Ok(config)
    }

    /// Canonical label for a method segment found in a run file name
    pub fn canonical_method<'a>(&'a self, segment: &'a str) -> &'a str {
        self.method_aliases
            .get(segment)
            .map(String::as_str)
            .unwrap_or(segment)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (name, level) in [
            ("significance_level", self.significance_level),
            ("high_significance_level", self.high_significance_level),
            (
                "very_high_significance_level",
                self.very_high_significance_level,
            ),
        ] {
            if !(0.0..=1.0).contains(&level) {
                return Err(format!("{} must be in [0, 1], got {}", name, level));
            }
        }

        if !(self.very_high_significance_level <= self.high_significance_level
            && self.high_significance_level <= self.significance_level)
        {
            return Err(format!(
                "significance levels must be ordered: {} <= {} <= {}",
                self.very_high_significance_level,
                self.high_significance_level,
                self.significance_level
            ));
        }

        if self.grid_points == 0 {
            return Err("grid_points must be >= 1".to_string());
        }

        if self.max_runs == 0 {
            return Err("max_runs must be >= 1".to_string());
        }

        if self.baseline_method == self.treatment_method {
            return Err(format!(
                "baseline_method and treatment_method must differ, both are {}",
                self.baseline_method
            ));
        }

        if self.param_min > self.param_max {
            return Err(format!(
                "param_min ({}) must not exceed param_max ({})",
                self.param_min, self.param_max
            ));
        }

        Ok(())
    }
}
