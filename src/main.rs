use anyhow::{Context, Result};
use benchstat::analysis::{self, Report};
use benchstat::cli::{
    AnalysisKind, Cli, Command, OutputFormat, PlotCommand, StatArgs, TableCommand, TableInput,
};
use benchstat::config::AnalysisConfig;
use benchstat::loader::{glob_files, list_csv_files, load_summary_files};
use benchstat::table::{load_table_records, RankedTable, SummaryTable, TableLayout};
use benchstat::{clean, plot};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Default directory of the summary tables
const DEFAULT_TABLE_DIR: &str = "out/synthetic/";

/// Initialize the tracing subscriber; logs always go to stderr
fn init_tracing(debug: bool, quiet: bool) {
    let level = if debug {
        tracing::Level::TRACE
    } else if quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::INFO
    };
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(level.into())
    } else {
        EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn emit<R: Report>(report: &R, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report.to_report_string()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

fn run_stat(args: StatArgs, mut config: AnalysisConfig) -> Result<()> {
    if let Some(cap) = args.max_iter {
        config.iteration_cap = cap;
    }

    match args.analysis {
        AnalysisKind::Coverage => {
            let (source, rates) = match &args.input {
                Some(input) => (
                    input.display().to_string(),
                    analysis::load_rate_table(input)?,
                ),
                None => (
                    args.dir.display().to_string(),
                    analysis::load_coverage_rates(&args.dir, &config)?,
                ),
            };
            let comparison =
                analysis::compare_coverage_rates(&source, &rates, &args.m1, &args.m2, &config)?;
            emit(&comparison, args.format)
        }
        AnalysisKind::Cox => {
            let paths = list_csv_files(&args.dir, true)?;
            let (records, usable) = load_summary_files(&paths, &args.duration);
            if usable == 0 {
                anyhow::bail!("No usable CSVs found under {}", args.dir.display());
            }
            tracing::info!("loaded {} records from {} files", records.len(), usable);

            let comparison = analysis::compare_durations(
                &args.dir.display().to_string(),
                &records,
                &args.m1,
                &args.m2,
                &config,
                args.by_benchmark,
            )?;
            emit(&comparison, args.format)
        }
    }
}

fn run_plot(command: PlotCommand, config: &AnalysisConfig) -> Result<()> {
    let summary = match command {
        PlotCommand::CoverageTime {
            dir,
            plot_dir,
            verify,
        } => plot::plot_coverage_time(&dir, &plot_dir, verify.as_deref(), config)?,
        PlotCommand::Coverage { dir, plot_dir } => plot::plot_coverage(&dir, &plot_dir, config)?,
        PlotCommand::Errorbar {
            glob,
            plot_dir,
            families,
            duration,
        } => {
            let (records, usable) = load_summary_files(&glob_files(&glob)?, &duration);
            if usable == 0 {
                anyhow::bail!("No usable CSVs match {}", glob);
            }
            plot::plot_errorbars(&records, &families, &plot_dir, config)?
        }
    };
    print!("{}", summary.to_report_string());
    Ok(())
}

fn table_paths(input: &TableInput) -> Result<Vec<PathBuf>> {
    if let Some(pattern) = &input.glob {
        return Ok(glob_files(pattern)?);
    }
    let dir = input
        .dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TABLE_DIR));
    Ok(list_csv_files(&dir, false)?)
}

fn run_table(command: TableCommand, config: &AnalysisConfig) -> Result<()> {
    let (input, ranked) = match command {
        TableCommand::Summary(input) => (input, false),
        TableCommand::Ranked(input) => (input, true),
    };

    let (records, usable) = load_table_records(&table_paths(&input)?, &input.duration);
    if usable == 0 {
        anyhow::bail!("No usable CSVs found for the table");
    }
    let layout = match &input.layout {
        Some(path) => TableLayout::from_file(path)
            .with_context(|| format!("failed to load layout {}", path.display()))?,
        None => TableLayout::default(),
    }
    .complete(&records);

    let tex = if ranked {
        RankedTable::new(&layout, &records, &input.duration, config.max_runs).render()
    } else {
        SummaryTable::new(&layout, &records, &input.duration).render()
    };
    print!("{}", tex);
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug, args.quiet);

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Clean(clean_args) => {
            let report = clean::clean_directory(&clean_args.dir, clean_args.dry_run)?;
            print!("{}", report.to_report_string());
        }
        Command::Stat(stat_args) => run_stat(stat_args, config)?,
        Command::Plot(command) => run_plot(command, &config)?,
        Command::Table(command) => run_table(command, &config)?,
    }

    Ok(())
}
