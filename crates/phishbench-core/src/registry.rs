use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A named dataset and where its columnar file lives.
///
/// Identity is the name; two descriptors with the same name never coexist in
/// one registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub name: String,
    pub location: PathBuf,
}

impl DatasetDescriptor {
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }
}

/// Ordered, immutable set of datasets for one run.
///
/// Iteration follows insertion order, which is also the row order of every
/// metric table built from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetRegistry {
    datasets: Vec<DatasetDescriptor>,
}

impl DatasetRegistry {
    /// Build a registry, rejecting empty names/locations and duplicate names.
    pub fn new(datasets: Vec<DatasetDescriptor>) -> Result<Self> {
        let mut names = BTreeSet::new();
        for dataset in &datasets {
            if dataset.name.trim().is_empty() {
                return Err(Error::InvalidRegistry("dataset name is empty".to_string()));
            }
            if dataset.location.as_os_str().is_empty() {
                return Err(Error::InvalidRegistry(format!(
                    "dataset '{}' has an empty location",
                    dataset.name
                )));
            }
            if !names.insert(dataset.name.as_str()) {
                return Err(Error::InvalidRegistry(format!(
                    "duplicate dataset name: {}",
                    dataset.name
                )));
            }
        }
        Ok(Self { datasets })
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatasetDescriptor> {
        self.datasets.iter()
    }

    pub fn get(&self, name: &str) -> Option<&DatasetDescriptor> {
        self.datasets.iter().find(|dataset| dataset.name == name)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Replace the location of an existing dataset or append a new one.
    pub fn with_override(mut self, dataset: DatasetDescriptor) -> Result<Self> {
        match self
            .datasets
            .iter_mut()
            .find(|existing| existing.name == dataset.name)
        {
            Some(existing) => existing.location = dataset.location,
            None => self.datasets.push(dataset),
        }
        Self::new(self.datasets)
    }
}

impl<'a> IntoIterator for &'a DatasetRegistry {
    type Item = &'a DatasetDescriptor;
    type IntoIter = std::slice::Iter<'a, DatasetDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.datasets.iter()
    }
}

/// Datasets benchmarked by default, with their file names.
const DEFAULT_DATASETS: &[(&str, &str)] = &[
    ("Phish360", "phish360_phish.parquet"),
    ("PWD2016", "PWD2016_phish.parquet"),
    ("PhishIntention", "PhishIntention_phish.parquet"),
    ("PILWD-134K", "PILWD-134K_phish.parquet"),
    ("VanNL126k", "VanNL126k_phish.parquet"),
];

/// The built-in registry, resolved against `data_dir`.
pub fn default_registry(data_dir: &Path) -> DatasetRegistry {
    DatasetRegistry {
        datasets: DEFAULT_DATASETS
            .iter()
            .map(|(name, file)| DatasetDescriptor::new(*name, data_dir.join(file)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_preserves_insertion_order() {
        let registry = DatasetRegistry::new(vec![
            DatasetDescriptor::new("zeta", "z.parquet"),
            DatasetDescriptor::new("alpha", "a.parquet"),
        ])
        .expect("valid registry");

        let names: Vec<&str> = registry.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn registry_rejects_duplicate_names() {
        let err = DatasetRegistry::new(vec![
            DatasetDescriptor::new("a", "a.parquet"),
            DatasetDescriptor::new("a", "b.parquet"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate dataset name"));
    }

    #[test]
    fn registry_rejects_empty_location() {
        let err = DatasetRegistry::new(vec![DatasetDescriptor::new("a", "")]).unwrap_err();
        assert!(matches!(err, Error::InvalidRegistry(_)));
    }

    #[test]
    fn override_replaces_location_in_place() {
        let registry = default_registry(Path::new("data"))
            .with_override(DatasetDescriptor::new("PWD2016", "/tmp/pwd.parquet"))
            .expect("override");

        assert_eq!(registry.len(), 5);
        let names: Vec<&str> = registry.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names[1], "PWD2016");
        assert_eq!(
            registry.get("PWD2016").map(|d| d.location.clone()),
            Some(PathBuf::from("/tmp/pwd.parquet"))
        );
    }

    #[test]
    fn default_registry_resolves_against_data_dir() {
        let registry = default_registry(Path::new("/data"));
        let first = registry.iter().next().expect("first dataset");
        assert_eq!(first.name, "Phish360");
        assert_eq!(
            first.location,
            PathBuf::from("/data/phish360_phish.parquet")
        );
    }
}
