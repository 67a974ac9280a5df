//! LaTeX result tables from summary CSVs
//!
//! Two layouts exist: [`SummaryTable`] (mean ± std and success rate per
//! method, sections separated by `\midrule`) and [`RankedTable`] (first
//! `max_runs` runs only, best method bolded, split over several tables).

pub mod layout;
pub mod ranked;
pub mod summary;

pub use layout::{MethodColumn, Section, TableLayout};
pub use ranked::{best_index, RankedCell, RankedTable};
pub use summary::{summary_cells, SummaryTable};

use crate::loader::load_summary_files;
use crate::record::SummaryRecord;
use std::path::PathBuf;

/// Escape underscores in a benchmark name
pub fn escape_tex(name: &str) -> String {
    name.replace('_', "\\_")
}

/// Records of every usable table file, skipping aggregated `summary` files
///
/// Returns the records and the number of files that contributed.
pub fn load_table_records(paths: &[PathBuf], entry: &str) -> (Vec<SummaryRecord>, usize) {
    let inputs: Vec<PathBuf> = paths
        .iter()
        .filter(|p| {
            let aggregated = p
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains("summary"));
            if aggregated {
                tracing::debug!("skipping aggregated file {}", p.display());
            }
            !aggregated
        })
        .cloned()
        .collect();
    tracing::info!("table inputs: {}", inputs.len());
    load_summary_files(&inputs, entry)
}
