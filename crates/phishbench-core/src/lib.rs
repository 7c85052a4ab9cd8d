//! Core contracts shared across phishbench crates.
//!
//! This crate defines the dataset registry, the logical column names the
//! metrics read, and the TOML configuration that resolves a registry for a run.

pub mod columns;
pub mod config;
pub mod error;
pub mod registry;

pub use config::{BenchConfig, DatasetEntry};
pub use error::{Error, Result};
pub use registry::{DatasetDescriptor, DatasetRegistry, default_registry};

/// Current contract version for `report.json` artifacts.
pub const REPORT_VERSION: &str = "0.1";
