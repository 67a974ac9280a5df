// Summary layout: mean ± std and success rate per benchmark and method,
// sections separated by \midrule

use super::layout::TableLayout;
use super::escape_tex;
use crate::descriptive::{mean, sample_std};
use crate::record::SummaryRecord;

/// Duration cell and success-rate cell of one (benchmark, method) group
///
/// No records at all means the bug was never found; records without a
/// usable duration mean every run timed out.
pub fn summary_cells(records: &[&SummaryRecord]) -> (String, String) {
    if records.is_empty() {
        return ("\\bugnotfound".to_string(), "0.0\\%".to_string());
    }

    let valid: Vec<f64> = records
        .iter()
        .filter_map(|r| r.duration)
        .filter(|d| *d >= 0.0)
        .collect();
    let Some(avg) = mean(&valid) else {
        return ("\\clock".to_string(), "0.0\\%".to_string());
    };

    let duration = match sample_std(&valid) {
        Some(std) => format!("{:.2} $\\pm$ {:.2}", avg, std),
        None => format!("{:.2}", avg),
    };
    let rate = valid.len() as f64 / records.len() as f64 * 100.0;
    (duration, format!("{:.1}\\%", rate))
}

/// LaTeX table of the summary layout
#[derive(Debug)]
pub struct SummaryTable<'a> {
    layout: &'a TableLayout,
    records: &'a [SummaryRecord],
    entry: &'a str,
}

impl<'a> SummaryTable<'a> {
    /// `entry` names the duration column in the sub-header
    pub fn new(layout: &'a TableLayout, records: &'a [SummaryRecord], entry: &'a str) -> Self {
        Self {
            layout,
            records,
            entry,
        }
    }

    fn header(&self) -> Vec<String> {
        let width = self.layout.columns_per_method();
        let last_column = 1 + self.layout.methods.len() * width;

        let groups: Vec<String> = self
            .layout
            .methods
            .iter()
            .map(|m| format!("\\multicolumn{{{}}}{{c}}{{{}}}", width, m.header_tex()))
            .collect();
        let sub: Vec<String> = self
            .layout
            .methods
            .iter()
            .map(|_| {
                if self.layout.skip_percent {
                    self.entry.to_string()
                } else {
                    format!("{} & \\%", self.entry)
                }
            })
            .collect();

        vec![
            format!("\\begin{{table}}[{}]", self.layout.placement),
            "\\centering".to_string(),
            format!("\\caption{{{}}}", self.layout.caption),
            format!("\\label{{{}}}", self.layout.label),
            "\\scriptsize".to_string(),
            format!("\\begin{{tabular}}{{{}}}", self.layout.column_spec()),
            "\\hline".to_string(),
            format!(
                "\\multirow{{2}}{{*}}{{\\textbf{{Benchmark}}}} & {} \\\\",
                groups.join(" & ")
            ),
            format!("\\cline{{2-{}}}", last_column),
            format!("& {} \\\\ \\hline", sub.join(" & ")),
        ]
    }

    /// One row: escaped name, then the cells of every method
    pub fn row(&self, benchmark: &str) -> String {
        tracing::debug!("Processing benchmark: {}", benchmark);
        let mut cells = vec![escape_tex(benchmark)];
        for method in &self.layout.methods {
            let group: Vec<&SummaryRecord> = self
                .records
                .iter()
                .filter(|r| r.benchmark == benchmark && r.method == method.name)
                .collect();
            if group.is_empty() {
                tracing::warn!(
                    "No data found for benchmark: {}, method: {}",
                    benchmark,
                    method.name
                );
            }
            let (duration, rate) = summary_cells(&group);
            cells.push(duration);
            if !self.layout.skip_percent {
                cells.push(rate);
            }
        }
        format!("{} \\\\", cells.join(" & "))
    }

    pub fn render(&self) -> String {
        let mut lines = self.header();
        for (idx, section) in self.layout.sections.iter().enumerate() {
            if idx > 0 {
                lines.push("\\midrule".to_string());
            }
            lines.extend(section.benchmarks.iter().map(|b| self.row(b)));
        }
        lines.push("\\hline".to_string());
        lines.push("\\end{tabular}".to_string());
        lines.push("\\end{table}".to_string());
        lines.join("\n") + "\n"
    }
}
