//! Coverage log cleaner
//!
//! The external tool can be killed mid-write, which leaves truncated lines,
//! repeated headers and empty files behind. The cleaner rewrites every log in
//! place so that it holds one header and only well-formed samples.

use crate::error::{AnalysisError, Result};
use crate::loader::{list_files, read_lossy};
use crate::record::{is_coverage_header, CoveragePoint};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Outcome of cleaning a directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub files_scanned: usize,
    pub files_rewritten: usize,
    pub empty_files_removed: usize,
    pub lines_kept: usize,
    pub lines_dropped: usize,
    pub files_failed: usize,
}

impl CleanReport {
    pub fn to_report_string(&self) -> String {
        format!(
            "Cleaned {} files: {} rewritten, {} empty removed, {} failed\nLines kept: {}, dropped: {}\n",
            self.files_scanned,
            self.files_rewritten,
            self.empty_files_removed,
            self.files_failed,
            self.lines_kept,
            self.lines_dropped
        )
    }
}

/// Cleaned content of one coverage log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedLog {
    pub header: Option<String>,
    pub lines: Vec<String>,
    pub dropped: Vec<String>,
}

impl CleanedLog {
    /// Text to write back: header first, every line newline-terminated
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in self.header.iter().chain(self.lines.iter()) {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Filter the content of one coverage log
///
/// The last header line wins; every data line must parse as
/// `(int, int, positive float)`.
pub fn clean_log(text: &str) -> CleanedLog {
    let mut header = None;
    let mut lines = Vec::new();
    let mut dropped = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if is_coverage_header(line) {
            header = Some(line.to_string());
        } else if CoveragePoint::parse_line(line).is_ok() {
            lines.push(line.to_string());
        } else {
            dropped.push(line.to_string());
        }
    }

    CleanedLog {
        header,
        lines,
        dropped,
    }
}

/// Outcome of cleaning a single file
#[derive(Debug, Clone, PartialEq, Eq)]
enum FileOutcome {
    Removed,
    Rewritten { kept: usize, dropped: usize },
}

fn clean_file(path: &Path, dry_run: bool) -> Result<FileOutcome> {
    let size = fs::metadata(path)
        .map_err(|e| AnalysisError::io(path, e))?
        .len();
    if size == 0 {
        if !dry_run {
            fs::remove_file(path).map_err(|e| AnalysisError::io(path, e))?;
        }
        tracing::info!("remove empty file {}", path.display());
        return Ok(FileOutcome::Removed);
    }

    let cleaned = clean_log(&read_lossy(path)?);
    for line in &cleaned.dropped {
        tracing::info!("remove {:?} in {}", line, path.display());
    }
    if !dry_run {
        fs::write(path, cleaned.render()).map_err(|e| AnalysisError::io(path, e))?;
    }
    Ok(FileOutcome::Rewritten {
        kept: cleaned.lines.len(),
        dropped: cleaned.dropped.len(),
    })
}

/// Clean every regular file directly inside `dir`
///
/// Failures on one file are logged and counted; the remaining files are
/// still processed. With `dry_run` nothing is written or deleted.
pub fn clean_directory(dir: &Path, dry_run: bool) -> Result<CleanReport> {
    let mut report = CleanReport::default();

    for path in list_files(dir, false)? {
        report.files_scanned += 1;
        match clean_file(&path, dry_run) {
            Ok(FileOutcome::Removed) => report.empty_files_removed += 1,
            Ok(FileOutcome::Rewritten { kept, dropped }) => {
                report.files_rewritten += 1;
                report.lines_kept += kept;
                report.lines_dropped += dropped;
            }
            Err(e) => {
                tracing::error!("failed to clean {}: {}", path.display(), e);
                report.files_failed += 1;
            }
        }
    }

    tracing::info!(
        "cleaned {} files under {}",
        report.files_scanned,
        dir.display()
    );
    Ok(report)
}
