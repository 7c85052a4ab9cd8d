mod artifacts;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use artifacts::{RunContext, init_logging, start_run, write_report};
use clap::{Args, Parser, Subcommand};
use phishbench_core::{BenchConfig, DatasetDescriptor, DatasetRegistry, Error as CoreError};
use phishbench_eval::{BenchmarkEngine, ColumnarSource, EvalError, ParquetReader, render_report};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("artifact error: {0}")]
    Artifacts(#[from] artifacts::ArtifactError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("benchmark error: {0}")]
    Eval(#[from] EvalError),
}

#[derive(Parser, Debug)]
#[command(name = "phishbench", version, about = "Phishing dataset benchmark")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute every metric and write the run artifacts.
    Run(RunArgs),
    /// List the resolved datasets and whether their files are present.
    Datasets(SourceArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Base directory for relative dataset locations.
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Add or replace a dataset, e.g. `--dataset PWD2016=/data/pwd.parquet`.
    #[arg(
        long = "dataset",
        value_name = "NAME=PATH",
        value_parser = parse_dataset
    )]
    datasets: Vec<DatasetDescriptor>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Output directory for runs.
    #[arg(long, value_name = "DIR")]
    run_dir: Option<PathBuf>,
    /// Also print the markdown report to stdout.
    #[arg(long, default_value_t = false)]
    print: bool,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run_benchmark(args),
        Command::Datasets(args) => list_datasets(args),
    }
}

fn run_benchmark(args: RunArgs) -> Result<(), CliError> {
    let RunArgs {
        source,
        run_dir,
        print,
    } = args;

    let mut config = load_config(&source)?;
    if let Some(run_dir) = run_dir {
        config.run_dir = run_dir;
    }
    let registry = resolve_registry(&config, source.datasets)?;

    let run_id = Uuid::new_v4().to_string();
    let ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        run_dir: config.run_dir.clone(),
        config_path: source.config,
        registry: registry.clone(),
    };

    let run_paths = start_run(&ctx)?;
    init_logging(Some(&run_paths.logs_path))?;

    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        datasets = registry.len(),
        run_root = %run_paths.root.display()
    );

    let timer = Instant::now();
    let engine = BenchmarkEngine::new(ParquetReader::new(), registry);
    let report = match engine.run() {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(event = "run_finished", status = "failed", error = %err);
            return Err(err.into());
        }
    };

    let files = write_report(&run_paths, &report)?;
    tracing::info!(
        event = "report_written",
        path = %run_paths.report_json_path.display()
    );
    for file in &files {
        tracing::info!(
            event = "csv_written",
            path = %file.path.display(),
            bytes = file.bytes
        );
    }

    if print {
        println!("{}", render_report(&report));
    }

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(
        event = "run_finished",
        status = "success",
        duration_ms = duration_ms,
        datasets_evaluated = report.summary.datasets_evaluated,
        skipped = report.skipped_datasets().len()
    );

    Ok(())
}

fn list_datasets(args: SourceArgs) -> Result<(), CliError> {
    init_logging(None)?;

    let config = load_config(&args)?;
    let registry = resolve_registry(&config, args.datasets)?;
    let reader = ParquetReader::new();

    for dataset in &registry {
        let status = DatasetStatus::check(&reader, &dataset.location);
        println!(
            "{:<16} {:<24} {}",
            dataset.name,
            status,
            dataset.location.display()
        );
    }

    Ok(())
}

/// Whether a dataset file can be read, as shown by `phishbench datasets`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DatasetStatus {
    Present { rows: u64 },
    Missing,
    Unreadable(String),
}

impl DatasetStatus {
    fn check<S: ColumnarSource>(source: &S, location: &Path) -> Self {
        match source.row_count(location) {
            Ok(rows) => DatasetStatus::Present { rows },
            Err(EvalError::NotFound { .. }) => DatasetStatus::Missing,
            Err(err) => DatasetStatus::Unreadable(err.to_string()),
        }
    }
}

impl fmt::Display for DatasetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DatasetStatus::Present { rows } => format!("present ({rows} rows)"),
            DatasetStatus::Missing => "missing".to_string(),
            DatasetStatus::Unreadable(message) => format!("unreadable: {message}"),
        };
        f.pad(&text)
    }
}

fn load_config(args: &SourceArgs) -> Result<BenchConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };
    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.clone();
    }
    Ok(config)
}

fn resolve_registry(
    config: &BenchConfig,
    overrides: Vec<DatasetDescriptor>,
) -> Result<DatasetRegistry, CliError> {
    let registry = overrides
        .into_iter()
        .try_fold(config.registry()?, DatasetRegistry::with_override)?;
    Ok(registry)
}

fn parse_dataset(value: &str) -> Result<DatasetDescriptor, String> {
    let (name, location) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got '{value}'"))?;
    let name = name.trim();
    let location = location.trim();
    if name.is_empty() || location.is_empty() {
        return Err(format!("expected NAME=PATH, got '{value}'"));
    }
    Ok(DatasetDescriptor::new(name, location))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dataset_overrides() {
        assert_eq!(
            parse_dataset("PWD2016=/data/pwd.parquet"),
            Ok(DatasetDescriptor::new("PWD2016", "/data/pwd.parquet"))
        );
        assert_eq!(
            parse_dataset("odd=a=b.parquet"),
            Ok(DatasetDescriptor::new("odd", "a=b.parquet"))
        );
        assert!(parse_dataset("no-separator").is_err());
        assert!(parse_dataset("=x.parquet").is_err());
        assert!(parse_dataset("name=").is_err());
    }

    #[test]
    fn overrides_replace_and_append_in_order() {
        let config = BenchConfig {
            data_dir: PathBuf::from("/data"),
            ..BenchConfig::default()
        };
        let registry = resolve_registry(
            &config,
            vec![
                DatasetDescriptor::new("PWD2016", "/elsewhere/pwd.parquet"),
                DatasetDescriptor::new("Extra", "/elsewhere/extra.parquet"),
            ],
        )
        .expect("registry");

        let names: Vec<&str> = registry.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Phish360",
                "PWD2016",
                "PhishIntention",
                "PILWD-134K",
                "VanNL126k",
                "Extra"
            ]
        );
        assert_eq!(
            registry.get("PWD2016").map(|d| d.location.clone()),
            Some(PathBuf::from("/elsewhere/pwd.parquet"))
        );
        assert_eq!(
            registry.get("Phish360").map(|d| d.location.clone()),
            Some(PathBuf::from("/data/phish360_phish.parquet"))
        );
    }

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "phishbench",
            "run",
            "--data-dir",
            "/data",
            "--dataset",
            "A=a.parquet",
            "--dataset",
            "B=b.parquet",
            "--print",
        ])
        .expect("parse");

        match cli.command {
            Command::Run(args) => {
                assert!(args.print);
                assert_eq!(args.source.data_dir, Some(PathBuf::from("/data")));
                assert_eq!(args.source.datasets.len(), 2);
                assert_eq!(args.run_dir, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn missing_file_reports_as_missing() {
        let status = DatasetStatus::check(
            &ParquetReader::new(),
            Path::new("/nonexistent/phishbench/file.parquet"),
        );
        assert_eq!(status, DatasetStatus::Missing);
        assert_eq!(format!("{status:<10}|"), "missing   |");
    }
}
