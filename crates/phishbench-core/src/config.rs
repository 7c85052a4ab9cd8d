use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::registry::{DatasetDescriptor, DatasetRegistry, default_registry};

/// One `[[datasets]]` entry of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub name: String,
    pub location: PathBuf,
}

/// Benchmark configuration loaded from `phishbench.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Base directory for relative dataset locations.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory under which run directories are created.
    #[serde(default = "default_run_dir")]
    pub run_dir: PathBuf,
    /// Datasets in benchmark order. Empty means the built-in registry.
    #[serde(default)]
    pub datasets: Vec<DatasetEntry>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_run_dir() -> PathBuf {
    PathBuf::from("runs")
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            run_dir: default_run_dir(),
            datasets: Vec::new(),
        }
    }
}

impl BenchConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve the dataset registry for this configuration.
    pub fn registry(&self) -> Result<DatasetRegistry> {
        if self.datasets.is_empty() {
            return Ok(default_registry(&self.data_dir));
        }

        let datasets = self
            .datasets
            .iter()
            .map(|entry| DatasetDescriptor::new(entry.name.clone(), self.resolve(&entry.location)))
            .collect();
        DatasetRegistry::new(datasets)
    }

    /// Resolve a location relative to `data_dir` unless it is absolute.
    pub fn resolve(&self, location: &Path) -> PathBuf {
        if location.is_absolute() {
            location.to_path_buf()
        } else {
            self.data_dir.join(location)
        }
    }
}
