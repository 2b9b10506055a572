use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::ConfigError;

/// Flat key/value data produced by a single provider load. Keys are normalised.
pub type ProviderData = BTreeMap<String, String>;

/// A source of configuration values.
///
/// `load` is called once per [`recompute`](crate::ConfigurationManager::recompute);
/// providers never push changes on their own.
pub trait ConfigurationProvider {
    /// Provenance reported in diagnostics and by
    /// [`ConfigurationManager::sources`](crate::ConfigurationManager::sources).
    fn source(&self) -> ConfigSource;

    /// Reads the provider's current values.
    fn load(&self) -> Result<ProviderData, ConfigError>;
}

/// Provenance of one configuration layer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl ConfigSource {
    pub fn new(kind: ConfigSourceKind) -> Self {
        ConfigSource {
            kind,
            path: None,
            prefix: None,
        }
    }

    pub fn for_file(path: PathBuf) -> Self {
        ConfigSource {
            kind: ConfigSourceKind::File,
            path: Some(path),
            prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Human-readable description used in log lines and CLI output.
    pub fn describe(&self) -> String {
        match (&self.kind, &self.path, &self.prefix) {
            (ConfigSourceKind::File, Some(path), _) => format!("file at {}", path.display()),
            (ConfigSourceKind::EnvironmentVariables, _, Some(prefix)) => {
                format!("environment variables (prefix {prefix})")
            }
            (kind, _, _) => kind.to_string(),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Kinds of configuration providers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigSourceKind {
    Memory,
    EnvironmentVariables,
    CommandLine,
    File,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Memory => "in-memory values",
            ConfigSourceKind::EnvironmentVariables => "environment variables",
            ConfigSourceKind::CommandLine => "command-line arguments",
            ConfigSourceKind::File => "file",
        };
        f.write_str(label)
    }
}
