use std::path::PathBuf;

use thiserror::Error;

use crate::metrics::MetricKind;

/// Errors emitted by the reader, the evaluators and the runner.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The dataset location does not resolve to a file. Recoverable: the
    /// runner skips the dataset.
    #[error("dataset not found: {}", location.display())]
    NotFound { location: PathBuf },
    /// A requested column is absent from the file schema. Recoverable:
    /// evaluators substitute a neutral default.
    #[error("column '{column}' not found in {}", location.display())]
    MissingColumn { location: PathBuf, column: String },
    #[error("invalid column subset: {0}")]
    InvalidSubset(String),
    #[error("unsupported column '{column}': {message}")]
    UnsupportedColumn { column: String, message: String },
    #[error("row computed for '{found}' instead of '{expected}'")]
    DatasetMismatch { expected: String, found: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// Fatal failure while evaluating one metric for one dataset.
    #[error("{metric} metric failed for dataset '{dataset}': {source}")]
    Metric {
        dataset: String,
        metric: MetricKind,
        #[source]
        source: Box<EvalError>,
    },
}
