// Ranked layout: the best method of every benchmark is bolded, benchmarks
// are split over several tables and families are separated by \hline

use super::layout::TableLayout;
use crate::descriptive::{mean, sample_std};
use crate::record::{family_of, SummaryRecord};
use std::cmp::Ordering;

/// Statistics of the first `max_runs` records of one (benchmark, method)
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCell {
    pub successes: usize,
    pub mean: f64,
    /// Sample std, 0 with fewer than two successes
    pub std: f64,
    /// Success rate in percent, rounded to the nearest 1/30
    pub percent: f64,
}

impl RankedCell {
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a SummaryRecord>,
        max_runs: usize,
    ) -> Self {
        let runs: Vec<&SummaryRecord> = records.into_iter().take(max_runs).collect();
        let valid: Vec<f64> = runs.iter().filter_map(|r| r.duration).collect();
        let percent = if runs.is_empty() {
            0.0
        } else {
            valid.len() as f64 / runs.len() as f64 * 100.0
        };

        Self {
            successes: valid.len(),
            mean: mean(&valid).unwrap_or(f64::INFINITY),
            std: sample_std(&valid).unwrap_or(0.0),
            percent: (percent * 30.0).round_ties_even() / 30.0,
        }
    }

    pub fn has_data(&self) -> bool {
        self.successes > 0
    }

    /// Higher percentage first, then lower mean, then lower std
    fn rank(&self, other: &Self) -> Ordering {
        self.percent
            .total_cmp(&other.percent)
            .then(other.mean.total_cmp(&self.mean))
            .then(other.std.total_cmp(&self.std))
    }

    fn duration_tex(&self) -> String {
        if !self.has_data() {
            return " \\clock ".to_string();
        }
        let mut tex = format!(" {:.1} ", self.mean);
        if self.successes > 1 {
            tex.push_str(&format!("$\\pm$ {:.1} ", self.std));
        }
        tex
    }
}

/// Index of the best cell that has data; the first one wins ties
pub fn best_index(cells: &[RankedCell]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, cell) in cells.iter().enumerate() {
        if !cell.has_data() {
            continue;
        }
        match best {
            Some(b) if cell.rank(&cells[b]) != Ordering::Greater => {}
            _ => best = Some(idx),
        }
    }
    best
}

/// LaTeX tables of the ranked layout
#[derive(Debug)]
pub struct RankedTable<'a> {
    layout: &'a TableLayout,
    records: &'a [SummaryRecord],
    entry: &'a str,
    max_runs: usize,
}

impl<'a> RankedTable<'a> {
    pub fn new(
        layout: &'a TableLayout,
        records: &'a [SummaryRecord],
        entry: &'a str,
        max_runs: usize,
    ) -> Self {
        Self {
            layout,
            records,
            entry,
            max_runs,
        }
    }

    pub fn row(&self, benchmark: &str) -> String {
        let cells: Vec<RankedCell> = self
            .layout
            .methods
            .iter()
            .map(|m| {
                RankedCell::from_records(
                    self.records
                        .iter()
                        .filter(|r| r.benchmark == benchmark && r.method == m.name),
                    self.max_runs,
                )
            })
            .collect();
        let best = best_index(&cells);

        let mut line = benchmark.to_string();
        for (idx, cell) in cells.iter().enumerate() {
            if Some(idx) == best {
                line.push_str(&format!(
                    "& \\textbf{{\\text{{{}}}}} &  \\textbf{{{:.1}}}",
                    cell.duration_tex(),
                    cell.percent
                ));
            } else {
                line.push_str(&format!("&{} & {:.1}", cell.duration_tex(), cell.percent));
            }
        }
        line.push_str("\\\\");
        line
    }

    fn table(&self, part: usize, benchmarks: &[&str], family: &mut String) -> Vec<String> {
        let splits = self.layout.splits;
        let last_column = 1 + 2 * self.layout.methods.len();
        let groups: Vec<String> = self
            .layout
            .methods
            .iter()
            .map(|m| format!("\\multicolumn{{2}}{{c}}{{{}}}", m.header_tex()))
            .collect();
        let sub: Vec<String> = self
            .layout
            .methods
            .iter()
            .map(|_| format!("{} & \\%", self.entry))
            .collect();

        let (caption, label) = if splits > 1 {
            (
                format!("{} ({}/{})", self.layout.caption, part, splits),
                format!("{}-{}", self.layout.label, part),
            )
        } else {
            (self.layout.caption.clone(), self.layout.label.clone())
        };

        let mut lines = vec![
            "\\begin{table}[htbp]".to_string(),
            "\\centering".to_string(),
            format!("\\caption{{{}}}", caption),
            format!("\\label{{{}}}", label),
            format!("\\begin{{tabular}}{{l{}}}", "c".repeat(2 * self.layout.methods.len())),
            "\\hline".to_string(),
            format!(
                "\\multirow{{2}}{{*}}{{\\textbf{{Benchmark}}}} & {}\\\\\\cline{{2-{}}}",
                groups.join(" & "),
                last_column
            ),
            format!(" & {}", sub.join(" & ")),
            " \\\\ \\hline".to_string(),
        ];

        for benchmark in benchmarks {
            if !benchmark.starts_with(&format!("{}(", family)) {
                lines.push("\\hline".to_string());
                *family = family_of(benchmark).to_string();
            }
            lines.push(self.row(benchmark));
        }

        lines.push("\\hline".to_string());
        lines.push("\\end{tabular}".to_string());
        lines.push("\\end{table}".to_string());
        lines
    }

    pub fn render(&self) -> String {
        let benchmarks: Vec<&str> = self.layout.benchmarks().collect();
        let mut family = benchmarks
            .first()
            .map(|b| family_of(b).to_string())
            .unwrap_or_default();

        let splits = self.layout.splits.max(1);
        let mut lines = Vec::new();
        for part in 0..splits {
            let start = part * benchmarks.len() / splits;
            let end = (part + 1) * benchmarks.len() / splits;
            lines.extend(self.table(part + 1, &benchmarks[start..end], &mut family));
        }
        lines.join("\n") + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::layout::{MethodColumn, Section};

    fn record(benchmark: &str, method: &str, duration: Option<f64>) -> SummaryRecord {
        SummaryRecord {
            benchmark: benchmark.to_string(),
            method: method.to_string(),
            duration,
            iter: None,
        }
    }

    #[test]
    fn test_percent_rounded_to_thirtieths() {
        let mut records: Vec<SummaryRecord> =
            (0..2).map(|_| record("a", "m", Some(1.0))).collect();
        records.push(record("a", "m", None));
        let cell = RankedCell::from_records(&records, 30);
        assert_eq!(format!("{:.1}", cell.percent), "66.7");
        assert_eq!(cell.successes, 2);
    }

    #[test]
    fn test_only_first_max_runs_count() {
        let mut records = vec![record("a", "m", None)];
        records.extend((0..4).map(|i| record("a", "m", Some(i as f64))));
        let cell = RankedCell::from_records(&records, 2);
        assert_eq!(cell.successes, 1);
        assert_eq!(cell.percent, 50.0);
        assert_eq!(cell.mean, 0.0);
    }

    #[test]
    fn test_empty_group_has_no_data() {
        let cell = RankedCell::from_records(std::iter::empty(), 30);
        assert!(!cell.has_data());
        assert_eq!(cell.percent, 0.0);
        assert_eq!(cell.duration_tex(), " \\clock ");
    }

    #[test]
    fn test_best_prefers_percent_then_mean_then_std() {
        let cell = |percent: f64, mean: f64, std: f64| RankedCell {
            successes: 2,
            mean,
            std,
            percent,
        };
        assert_eq!(
            best_index(&[cell(50.0, 1.0, 0.0), cell(100.0, 9.0, 0.0)]),
            Some(1)
        );
        assert_eq!(
            best_index(&[cell(100.0, 2.0, 0.0), cell(100.0, 1.0, 5.0)]),
            Some(1)
        );
        assert_eq!(
            best_index(&[cell(100.0, 1.0, 2.0), cell(100.0, 1.0, 1.0)]),
            Some(1)
        );
        assert_eq!(
            best_index(&[cell(100.0, 1.0, 1.0), cell(100.0, 1.0, 1.0)]),
            Some(0)
        );
    }

    #[test]
    fn test_best_ignores_cells_without_data() {
        let empty = RankedCell::from_records(std::iter::empty(), 30);
        assert_eq!(best_index(&[empty.clone()]), None);
    }

    fn layout() -> TableLayout {
        TableLayout {
            caption: "Heuristics".to_string(),
            label: "tab:variations".to_string(),
            methods: vec![MethodColumn::new("no"), MethodColumn::new("3phstar")],
            sections: vec![Section {
                benchmarks: vec![
                    "ms-queue(3)".to_string(),
                    "ms-queue(4)".to_string(),
                    "treiber-stack(3)".to_string(),
                ],
            }],
            ..TableLayout::default()
        }
    }

    #[test]
    fn test_row_bolds_best_method() {
        let records = vec![
            record("ms-queue(3)", "no", Some(4.0)),
            record("ms-queue(3)", "no", Some(6.0)),
            record("ms-queue(3)", "3phstar", Some(1.0)),
            record("ms-queue(3)", "3phstar", None),
        ];
        let layout = layout();
        let table = RankedTable::new(&layout, &records, "Sec", 30);
        assert_eq!(
            table.row("ms-queue(3)"),
            "ms-queue(3)& \\textbf{\\text{ 5.0 $\\pm$ 1.4 }} &  \\textbf{100.0}& 1.0  & 50.0\\\\"
        );
        assert_eq!(
            table.row("ms-queue(4)"),
            "ms-queue(4)& \\clock  & 0.0& \\clock  & 0.0\\\\"
        );
    }

    #[test]
    fn test_render_splits_and_separates_families() {
        let layout = layout();
        let tex = RankedTable::new(&layout, &[], "Sec", 30).render();
        assert_eq!(tex.matches("\\begin{table}").count(), 2);
        assert!(tex.contains("\\caption{Heuristics (1/2)}"));
        assert!(tex.contains("\\label{tab:variations-2}"));

        let lines: Vec<&str> = tex.lines().collect();
        let second = lines
            .iter()
            .position(|l| l.starts_with("\\caption{Heuristics (2/2)}"))
            .unwrap();
        // second table starts with ms-queue(4): same family, no separator
        assert!(lines[second + 7].starts_with("ms-queue(4)"));
        let treiber = lines
            .iter()
            .position(|l| l.starts_with("treiber-stack(3)"))
            .unwrap();
        assert_eq!(lines[treiber - 1], "\\hline");
    }
}
