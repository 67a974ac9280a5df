//! CLI argument parsing for benchstat

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for statistical reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

/// Which comparison `stat` runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnalysisKind {
    /// Stratified Cox model on time to completion
    Cox,
    /// Stratified Mann-Whitney U test on coverage rate
    Coverage,
}

#[derive(Parser, Debug)]
#[command(name = "benchstat")]
#[command(version)]
#[command(
    about = "Clean, compare and plot results of repeated concurrency-testing runs",
    long_about = None
)]
pub struct Cli {
    /// Analysis configuration (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Trace-level logs on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "debug")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Remove malformed lines from coverage logs and delete empty logs
    Clean(CleanArgs),
    /// Compare two methods statistically
    Stat(StatArgs),
    /// Draw SVG figures
    #[command(subcommand)]
    Plot(PlotCommand),
    /// Print LaTeX result tables
    #[command(subcommand)]
    Table(TableCommand),
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Directory of coverage logs
    #[arg(default_value = "out/coverage/")]
    pub dir: PathBuf,

    /// Report what would change without writing or deleting
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct StatArgs {
    /// Directory to scan (recursively) for CSVs or coverage logs
    #[arg(long, default_value = "out/")]
    pub dir: PathBuf,

    /// Baseline method (group 0)
    #[arg(long, default_value = "Random")]
    pub m1: String,

    /// Compared method (group 1)
    #[arg(long, default_value = "3phstar")]
    pub m2: String,

    /// Duration column of the summary CSVs
    #[arg(long, default_value = "Sec")]
    pub duration: String,

    /// Also fit each benchmark on its own
    #[arg(long)]
    pub by_benchmark: bool,

    #[arg(long, value_enum, default_value = "cox")]
    pub analysis: AnalysisKind,

    /// Iteration count at which a run is censored (overrides the config)
    #[arg(long, value_name = "N")]
    pub max_iter: Option<u64>,

    /// Pre-aggregated `Benchmark,Caption,Coverage` table for the coverage test
    #[arg(long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum PlotCommand {
    /// Coverage over time, runs aligned by truncation
    CoverageTime {
        #[arg(long, default_value = "out/coverage/")]
        dir: PathBuf,

        #[arg(long, default_value = "out/coverage/plots/")]
        plot_dir: PathBuf,

        /// `Benchmark,Iter` totals used to annotate final coverage
        #[arg(long, value_name = "CSV")]
        verify: Option<PathBuf>,
    },
    /// Coverage over time, runs interpolated on a uniform grid
    Coverage {
        #[arg(long, default_value = "out/buggy/coverage/")]
        dir: PathBuf,

        #[arg(long, default_value = "out/buggy/coverage_plots/")]
        plot_dir: PathBuf,
    },
    /// Mean ± std of durations per benchmark parameter
    Errorbar {
        /// Summary CSVs to load
        #[arg(long, default_value = "out/buggy/data/4versions-*.csv")]
        glob: String,

        #[arg(long, default_value = "out/buggy/plots/")]
        plot_dir: PathBuf,

        /// Benchmark family to draw (repeatable); all families by default
        #[arg(long = "family", value_name = "NAME")]
        families: Vec<String>,

        #[arg(long, default_value = "Sec")]
        duration: String,
    },
}

/// Where table records come from
#[derive(Args, Debug)]
pub struct TableInput {
    /// Directory of summary CSVs (not recursive)
    #[arg(long, conflicts_with = "glob")]
    pub dir: Option<PathBuf>,

    /// Glob of summary CSVs
    #[arg(long)]
    pub glob: Option<String>,

    /// TOML table layout
    #[arg(long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    #[arg(long, default_value = "Sec")]
    pub duration: String,
}

#[derive(Subcommand, Debug)]
pub enum TableCommand {
    /// Mean ± std and success rate per method
    Summary(TableInput),
    /// First runs only, best method bolded, split over several tables
    Ranked(TableInput),
}
