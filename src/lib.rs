//! benchstat - statistics, figures and tables for repeated concurrency-testing runs
//!
//! The external tester writes one coverage log per run
//! (`<benchmark>-<method>-<index>`, lines `Iter,Cover,SecElapsed`) and
//! summary CSVs with one row per run. This library cleans those logs,
//! aligns runs into averaged curves, compares two methods with rank and
//! survival tests, and renders SVG figures and LaTeX tables.

pub mod align;
pub mod analysis;
pub mod clean;
pub mod cli;
pub mod config;
pub mod descriptive;
pub mod error;
pub mod hypothesis;
pub mod loader;
pub mod plot;
pub mod record;
pub mod table;

pub use error::{AnalysisError, Result};
