//! Benchmark run records
//!
//! Two record shapes come out of the external tool:
//! - coverage logs, one `Iter,Cover,SecElapsed` line per sample, one file per run
//! - summary tables with one row per run (`Benchmark,Method,Sec[,Iter]`)

use crate::error::{AnalysisError, Result};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Header line of a coverage log
pub const COVERAGE_HEADER: &str = "Iter,Cover,SecElapsed";

/// Suffix marking the paired time file of a run
pub const TIME_SUFFIX: &str = "-time";

/// One sample of a coverage log
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoveragePoint {
    pub iter: i64,
    pub cover: i64,
    pub sec_elapsed: f64,
}

impl CoveragePoint {
    /// Parse a data line of a coverage log
    ///
    /// A valid line has exactly two commas, integer `Iter` and `Cover`
    /// fields and a strictly positive `SecElapsed`.
    ///
    /// # Example
    /// ```
    /// use benchstat::record::CoveragePoint;
    ///
    /// let point = CoveragePoint::parse_line("3,9,3.5").unwrap();
    /// assert_eq!(point.cover, 9);
    /// assert!(CoveragePoint::parse_line("3,9,0").is_err());
    /// ```
    pub fn parse_line(line: &str) -> Result<Self> {
        let line = line.trim();
        if line.matches(',').count() != 2 {
            return Err(AnalysisError::MalformedLine(format!(
                "expected 3 fields: {}",
                line
            )));
        }

        let mut fields = line.split(',').map(str::trim);
        let (Some(iter), Some(cover), Some(sec)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(AnalysisError::MalformedLine(line.to_string()));
        };

        let iter = iter
            .parse::<i64>()
            .map_err(|_| AnalysisError::MalformedLine(format!("Iter is not an integer: {}", line)))?;
        let cover = cover.parse::<i64>().map_err(|_| {
            AnalysisError::MalformedLine(format!("Cover is not an integer: {}", line))
        })?;
        let sec_elapsed = sec.parse::<f64>().map_err(|_| {
            AnalysisError::MalformedLine(format!("SecElapsed is not a number: {}", line))
        })?;

        if sec_elapsed.is_nan() || sec_elapsed <= 0.0 {
            return Err(AnalysisError::MalformedLine(format!(
                "non-positive SecElapsed: {}",
                line
            )));
        }

        Ok(Self {
            iter,
            cover,
            sec_elapsed,
        })
    }
}

/// True for the header line of a coverage log
pub fn is_coverage_header(line: &str) -> bool {
    line.trim().starts_with(COVERAGE_HEADER)
}

/// Components of a run file name `<benchmark>-<method>-<index>[-time]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunName {
    pub benchmark: String,
    /// Method segment as written in the file name (before alias mapping)
    pub method: String,
    pub index: u32,
    /// Paired time file rather than a coverage log
    pub is_time: bool,
}

fn run_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<bench>.+)-(?P<method>[^-]+)-(?P<index>\d+)(?P<time>-time)?(?:\.\w+)?$")
            .expect("run name pattern is valid")
    })
}

impl RunName {
    /// Parse a run file name; benchmark names may contain `-` and `(N)`
    ///
    /// # Example
    /// ```
    /// use benchstat::record::RunName;
    ///
    /// let name = RunName::parse("ms-queue(3)-rand-12").unwrap();
    /// assert_eq!(name.benchmark, "ms-queue(3)");
    /// assert_eq!(name.method, "rand");
    /// assert_eq!(name.index, 12);
    /// ```
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = run_name_regex().captures(file_name)?;
        Some(Self {
            benchmark: caps["bench"].to_string(),
            method: caps["method"].to_string(),
            index: caps["index"].parse().ok()?,
            is_time: caps.name("time").is_some(),
        })
    }

    /// File name of the paired time file for this run
    pub fn time_file_name(&self) -> String {
        format!(
            "{}-{}-{}{}",
            self.benchmark, self.method, self.index, TIME_SUFFIX
        )
    }
}

/// One row of a summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub benchmark: String,
    pub method: String,
    /// `None` when the run timed out or the cell did not parse
    pub duration: Option<f64>,
    pub iter: Option<u64>,
}

impl SummaryRecord {
    /// A run with a usable, strictly positive duration
    pub fn completed_duration(&self) -> Option<f64> {
        self.duration.filter(|d| *d > 0.0)
    }
}

/// Split a parameterized benchmark name `family(N)` into its parts
///
/// # Example
/// ```
/// use benchstat::record::split_family;
///
/// assert_eq!(split_family("mp(10)"), Some(("mp", 10)));
/// assert_eq!(split_family("CS-account"), None);
/// ```
pub fn split_family(benchmark: &str) -> Option<(&str, u32)> {
    let open = benchmark.rfind('(')?;
    let inner = benchmark[open + 1..].strip_suffix(')')?;
    let param = inner.parse().ok()?;
    Some((&benchmark[..open], param))
}

/// Family of a benchmark name, the name itself when unparameterized
pub fn family_of(benchmark: &str) -> &str {
    match benchmark.find('(') {
        Some(open) => &benchmark[..open],
        None => benchmark,
    }
}
