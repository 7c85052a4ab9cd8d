use thiserror::Error;

/// Core error type shared across phishbench crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The registry violates internal invariants.
    #[error("invalid registry: {0}")]
    InvalidRegistry(String),
    /// The configuration file could not be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
    /// Filesystem failure while reading configuration.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results returned by phishbench crates.
pub type Result<T> = std::result::Result<T, Error>;
