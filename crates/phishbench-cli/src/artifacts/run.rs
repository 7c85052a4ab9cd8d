use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use phishbench_core::{DatasetEntry, DatasetRegistry, REPORT_VERSION};
use phishbench_eval::output::{ExportedFile, write_report_csv};
use phishbench_eval::{Report, render_report};
use serde::Serialize;

use super::ArtifactResult;

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub run_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    pub registry: DatasetRegistry,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub report_version: String,
    pub config_path: Option<PathBuf>,
    pub datasets: Vec<DatasetEntry>,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub logs_path: PathBuf,
    pub report_json_path: PathBuf,
    pub report_md_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> ArtifactResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let config_path = root.join("config.json");
    let logs_path = root.join("logs.ndjson");

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        report_version: REPORT_VERSION.to_string(),
        config_path: ctx.config_path.clone(),
        datasets: ctx
            .registry
            .iter()
            .map(|dataset| DatasetEntry {
                name: dataset.name.clone(),
                location: dataset.location.clone(),
            })
            .collect(),
        git: collect_git_info(),
    };

    write_json(&config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)?;

    Ok(RunPaths {
        report_json_path: root.join("report.json"),
        report_md_path: root.join("report.md"),
        logs_path,
        root,
    })
}

/// Write `report.json`, `report.md` and the CSV tables into the run directory.
pub fn write_report(paths: &RunPaths, report: &Report) -> ArtifactResult<Vec<ExportedFile>> {
    write_json(&paths.report_json_path, report)?;

    let mut markdown = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&paths.report_md_path)?;
    markdown.write_all(render_report(report).as_bytes())?;

    Ok(write_report_csv(&paths.root, report)?)
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> ArtifactResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use phishbench_core::DatasetDescriptor;
    use phishbench_eval::{BenchmarkEngine, ParquetReader};

    fn temp_run_dir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("phishbench_cli_run_{}", uuid::Uuid::new_v4()));
        dir
    }

    fn read_json(path: &Path) -> serde_json::Value {
        let file = std::fs::File::open(path).expect("open json");
        serde_json::from_reader(file).expect("parse json")
    }

    #[test]
    fn start_run_writes_config_and_log_file() {
        let run_dir = temp_run_dir();
        let dataset = DatasetDescriptor::new("Phish360", "data/phish360_phish.parquet");
        let registry = DatasetRegistry::new(vec![dataset]).expect("registry");
        let ctx = RunContext {
            run_id: "abc".to_string(),
            started_at: Utc::now(),
            run_dir: run_dir.clone(),
            config_path: None,
            registry,
        };

        let paths = start_run(&ctx).expect("start run");
        assert!(paths.root.starts_with(&run_dir));
        assert!(
            paths
                .root
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with("__run_abc"))
        );
        assert!(paths.logs_path.exists());

        let config = read_json(&paths.root.join("config.json"));
        assert_eq!(config["run_id"], "abc");
        assert_eq!(config["datasets"][0]["name"], "Phish360");
        assert_eq!(config["report_version"], REPORT_VERSION);
    }

    #[test]
    fn write_report_emits_json_markdown_and_csv() {
        let run_dir = temp_run_dir();
        let gone = DatasetDescriptor::new("Gone", run_dir.join("gone.parquet"));
        let registry = DatasetRegistry::new(vec![gone]).expect("registry");
        let ctx = RunContext {
            run_id: "def".to_string(),
            started_at: Utc::now(),
            run_dir,
            config_path: None,
            registry: registry.clone(),
        };
        let paths = start_run(&ctx).expect("start run");

        let report = BenchmarkEngine::new(ParquetReader::new(), registry)
            .run()
            .expect("run");
        let files = write_report(&paths, &report).expect("write report");

        assert_eq!(files.len(), 7);
        assert!(files.iter().all(|file| file.path.exists()));
        let markdown = std::fs::read_to_string(&paths.report_md_path).unwrap();
        assert!(markdown.contains("- Gone: file not found"));

        let json = read_json(&paths.report_json_path);
        assert_eq!(json["summary"]["datasets_evaluated"], 0);
        let skipped = json["skipped"].as_array().map(Vec::len);
        assert_eq!(skipped, Some(6));
        assert_eq!(json["skipped"][0]["reason"]["kind"], "not_found");
    }
}
