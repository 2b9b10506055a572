use std::io;
use std::path::PathBuf;

use host_bootstrap_config::ConfigError;
use thiserror::Error;

/// Errors raised by host builders and the callbacks registered on them.
#[derive(Debug, Error)]
pub enum HostBuilderError {
    #[error("argument '{parameter}' must be provided")]
    InvalidArgument { parameter: &'static str },
    #[error("invalid operation: {message}")]
    InvalidOperation { message: &'static str },
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("failed to resolve content root {path}: {source}")]
    ContentRoot { path: PathBuf, source: io::Error },
    #[error("content root {path} is not valid UTF-8")]
    NonUtf8Path { path: PathBuf },
    #[error("configuration callback failed: {message}")]
    Callback { message: String },
}

impl HostBuilderError {
    /// Error for a failure inside a user-supplied callback.
    pub fn callback(message: impl Into<String>) -> Self {
        HostBuilderError::Callback {
            message: message.into(),
        }
    }
}
