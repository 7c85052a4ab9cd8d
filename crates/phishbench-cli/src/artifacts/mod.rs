mod logging;
mod run;

pub use logging::init_logging;
pub use run::{RunContext, start_run, write_report};

use phishbench_eval::EvalError;
use thiserror::Error;

/// Errors raised while writing run artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("export error: {0}")]
    Export(#[from] EvalError),
    #[error("logging error: {0}")]
    Logging(String),
}

/// Result type for artifact operations.
pub type ArtifactResult<T> = std::result::Result<T, ArtifactError>;
