use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while loading providers or reading typed values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file {path} not found")]
    FileNotFound { path: PathBuf },
    #[error("failed to read configuration file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid command-line argument '{argument}': {message}")]
    CommandLine { argument: String, message: String },
    #[error("invalid value '{value}' for key '{key}': {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}
