//! Table layouts loaded from TOML
//!
//! ```toml
//! caption = "Synthetic benchmarks"
//! label = "tab:synthetic-time"
//! placement = "!t"
//!
//! [[methods]]
//! name = "GenMC"
//! header = '\bf\genmc'
//!
//! [[sections]]
//! benchmarks = ["mp(5)", "mp(6)"]
//! ```

use crate::error::{AnalysisError, Result};
use crate::record::{family_of, split_family, SummaryRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// One method column group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodColumn {
    /// Value of the `Method` column in the data
    pub name: String,
    /// LaTeX shown in the header; defaults to `\textbf{<name>}`
    #[serde(default)]
    pub header: Option<String>,
}

impl MethodColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: None,
        }
    }

    pub fn header_tex(&self) -> String {
        self.header
            .clone()
            .unwrap_or_else(|| format!("\\textbf{{{}}}", self.name))
    }
}

/// Benchmarks printed together, sections are separated by a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub benchmarks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    pub caption: String,
    pub label: String,
    pub placement: String,
    /// Drop the success-rate sub-column
    pub skip_percent: bool,
    /// Number of tables the ranked layout is split into
    pub splits: usize,
    pub methods: Vec<MethodColumn>,
    pub sections: Vec<Section>,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            caption: String::new(),
            label: "tab:benchmarks".to_string(),
            placement: "!t".to_string(),
            skip_percent: false,
            splits: 2,
            methods: Vec::new(),
            sections: Vec::new(),
        }
    }
}

impl TableLayout {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let layout: Self =
            toml::from_str(text).map_err(|e| AnalysisError::Config(e.to_string()))?;
        if layout.splits == 0 {
            return Err(AnalysisError::Config("splits must be at least 1".to_string()));
        }
        Ok(layout)
    }

    /// Fill in methods and sections missing from the layout using `records`
    ///
    /// Methods come in order of first appearance; the single default
    /// section lists every benchmark sorted by family, then by parameter.
    pub fn complete(mut self, records: &[SummaryRecord]) -> Self {
        if self.methods.is_empty() {
            for record in records {
                if !self.methods.iter().any(|m| m.name == record.method) {
                    self.methods.push(MethodColumn::new(record.method.clone()));
                }
            }
        }
        if self.sections.is_empty() {
            let mut benchmarks: Vec<&str> = records
                .iter()
                .map(|r| r.benchmark.as_str())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            benchmarks.sort_by_key(|b| (family_of(*b), split_family(*b).map(|(_, p)| p)));
            self.sections.push(Section {
                benchmarks: benchmarks.into_iter().map(str::to_string).collect(),
            });
        }
        self
    }

    /// Every benchmark in section order
    pub fn benchmarks(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|s| s.benchmarks.iter().map(String::as_str))
    }

    /// Sub-columns per method
    pub fn columns_per_method(&self) -> usize {
        if self.skip_percent {
            1
        } else {
            2
        }
    }

    /// `l` followed by one `c` per data column
    pub fn column_spec(&self) -> String {
        format!(
            "l{}",
            "c".repeat(self.methods.len() * self.columns_per_method())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(benchmark: &str, method: &str) -> SummaryRecord {
        SummaryRecord {
            benchmark: benchmark.to_string(),
            method: method.to_string(),
            duration: Some(1.0),
            iter: None,
        }
    }

    #[test]
    fn test_parse_layout() {
        let layout = TableLayout::from_toml(
            r#"
caption = "Synthetic"
label = "tab:syntatic-time"

[[methods]]
name = "GenMC"
header = '\bf\genmc'

[[methods]]
name = "Random"

[[sections]]
benchmarks = ["mp(5)", "mp(6)"]

[[sections]]
benchmarks = ["n1-val(10)"]
"#,
        )
        .unwrap();
        assert_eq!(layout.caption, "Synthetic");
        assert_eq!(layout.placement, "!t");
        assert_eq!(layout.methods[0].header_tex(), "\\bf\\genmc");
        assert_eq!(layout.methods[1].header_tex(), "\\textbf{Random}");
        assert_eq!(layout.sections.len(), 2);
        assert_eq!(layout.column_spec(), "lcccc");
        assert_eq!(layout.benchmarks().count(), 3);
    }

    #[test]
    fn test_complete_from_records() {
        let records = vec![
            record("sb", "Random"),
            record("mp(5)", "3phstar"),
            record("mp(5)", "Random"),
            record("mp(10)", "Random"),
        ];
        let layout = TableLayout::default().complete(&records);
        let methods: Vec<&str> = layout.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["Random", "3phstar"]);
        assert_eq!(layout.sections[0].benchmarks, vec!["mp(5)", "mp(10)", "sb"]);
    }

    #[test]
    fn test_zero_splits_rejected() {
        assert!(TableLayout::from_toml("splits = 0").is_err());
    }

    #[test]
    fn test_skip_percent_halves_columns() {
        let layout = TableLayout {
            skip_percent: true,
            methods: vec![MethodColumn::new("a"), MethodColumn::new("b")],
            ..TableLayout::default()
        };
        assert_eq!(layout.column_spec(), "lcc");
    }
}
