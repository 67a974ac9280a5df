//! Error taxonomy for benchmark analysis
//!
//! Malformed rows, missing data and statistical fit failures are all
//! recoverable at the batch level: callers log them and move on to the
//! next file, group or comparison.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the analysis library
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing column {column} in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Malformed line: {0}")]
    MalformedLine(String),

    #[error("No data: {0}")]
    NoData(String),

    #[error("Insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Model fit failed: {0}")]
    FitFailed(String),

    #[error("Plot rendering failed: {0}")]
    Plot(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
