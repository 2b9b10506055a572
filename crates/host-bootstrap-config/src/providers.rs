use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::{
    combine_key, normalize_key, ConfigError, ConfigSource, ConfigSourceKind,
    ConfigurationProvider, ProviderData, KEY_DELIMITER,
};

/// Fixed key/value pairs held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryProvider {
    data: ProviderData,
}

impl MemoryProvider {
    pub fn new<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let data = values
            .into_iter()
            .map(|(key, value)| (normalize_key(key.as_ref()), value.into()))
            .collect();
        MemoryProvider { data }
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.data.insert(normalize_key(key), value.into());
    }
}

impl ConfigurationProvider for MemoryProvider {
    fn source(&self) -> ConfigSource {
        ConfigSource::new(ConfigSourceKind::Memory)
    }

    fn load(&self) -> Result<ProviderData, ConfigError> {
        Ok(self.data.clone())
    }
}

/// Environment variables, optionally filtered by a case-insensitive prefix.
///
/// The prefix is stripped from matching names and `__` is read as the key
/// delimiter, so `HOST_LOGGING__LEVEL` with prefix `HOST_` becomes
/// `logging:level`.
#[derive(Clone, Debug, Default)]
pub struct EnvironmentVariablesProvider {
    prefix: Option<String>,
    variables: Option<Vec<(String, String)>>,
}

impl EnvironmentVariablesProvider {
    /// Reads the process environment on every load.
    pub fn new(prefix: Option<&str>) -> Self {
        EnvironmentVariablesProvider {
            prefix: prefix.map(str::to_owned),
            variables: None,
        }
    }

    /// Reads a fixed set of variables instead of the process environment.
    pub fn with_variables<I, K, V>(prefix: Option<&str>, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        EnvironmentVariablesProvider {
            prefix: prefix.map(str::to_owned),
            variables: Some(
                variables
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }

    fn key_for(&self, name: &str) -> Option<String> {
        let stripped = match &self.prefix {
            Some(prefix) => {
                let head = name.get(..prefix.len())?;
                if !head.eq_ignore_ascii_case(prefix) {
                    return None;
                }
                &name[prefix.len()..]
            }
            None => name,
        };
        let key = normalize_key(&stripped.replace("__", KEY_DELIMITER));
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }
}

impl ConfigurationProvider for EnvironmentVariablesProvider {
    fn source(&self) -> ConfigSource {
        ConfigSource::new(ConfigSourceKind::EnvironmentVariables).with_prefix(self.prefix.clone())
    }

    fn load(&self) -> Result<ProviderData, ConfigError> {
        let variables: Vec<(String, String)> = match &self.variables {
            Some(fixed) => fixed.clone(),
            // Variables that are not valid UTF-8 cannot form keys.
            None => env::vars_os()
                .filter_map(|(name, value)| {
                    Some((name.into_string().ok()?, value.into_string().ok()?))
                })
                .collect(),
        };

        let mut data = ProviderData::new();
        for (name, value) in variables {
            if let Some(key) = self.key_for(&name) {
                data.insert(key, value);
            }
        }
        Ok(data)
    }
}

/// Command-line arguments.
#[derive(Clone, Debug, Default)]
pub struct CommandLineProvider {
    args: Vec<String>,
}

impl CommandLineProvider {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandLineProvider {
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl ConfigurationProvider for CommandLineProvider {
    fn source(&self) -> ConfigSource {
        ConfigSource::new(ConfigSourceKind::CommandLine)
    }

    fn load(&self) -> Result<ProviderData, ConfigError> {
        parse_command_line(&self.args)
    }
}

/// Parses `--key=value`, `--key value`, `/key=value`, `/key value` and
/// `key=value` arguments into provider data.
///
/// Arguments matching none of these forms are skipped. A switch with no
/// inline value and nothing after it is an error.
pub fn parse_command_line(args: &[String]) -> Result<ProviderData, ConfigError> {
    let mut data = ProviderData::new();
    let mut index = 0;

    while index < args.len() {
        let argument = &args[index];
        let (body, switched) = if let Some(rest) = argument.strip_prefix("--") {
            (rest, true)
        } else if let Some(rest) = argument.strip_prefix('/') {
            (rest, true)
        } else {
            (argument.as_str(), false)
        };

        let (key, value) = match body.split_once('=') {
            Some((key, value)) => (key, value.to_owned()),
            None if switched => match args.get(index + 1) {
                Some(value) => {
                    index += 1;
                    (body, value.clone())
                }
                None => {
                    return Err(ConfigError::CommandLine {
                        argument: argument.clone(),
                        message: "expected a value after the switch".into(),
                    })
                }
            },
            None => {
                debug!(argument = %argument, "skipping unrecognised command-line argument");
                index += 1;
                continue;
            }
        };

        let key = normalize_key(key);
        if key.is_empty() {
            return Err(ConfigError::CommandLine {
                argument: argument.clone(),
                message: "key cannot be empty".into(),
            });
        }
        data.insert(key, value);
        index += 1;
    }

    Ok(data)
}

/// A TOML file flattened into delimited keys.
///
/// Tables contribute their key as a segment and arrays their element index,
/// so `[logging] levels = ["a"]` yields `logging:levels:0 = a`.
#[derive(Clone, Debug)]
pub struct TomlFileProvider {
    path: PathBuf,
    optional: bool,
}

impl TomlFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TomlFileProvider {
            path: path.into(),
            optional: false,
        }
    }

    /// Treats a missing file as empty instead of failing the load.
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Resolves a relative path against `base`.
    pub fn with_base_dir(mut self, base: &Path) -> Self {
        if self.path.is_relative() {
            self.path = base.join(&self.path);
        }
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

impl ConfigurationProvider for TomlFileProvider {
    fn source(&self) -> ConfigSource {
        ConfigSource::for_file(self.path.clone())
    }

    fn load(&self) -> Result<ProviderData, ConfigError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                if self.optional {
                    trace!(path = %self.path.display(), "optional configuration file missing");
                    return Ok(ProviderData::new());
                }
                return Err(ConfigError::FileNotFound {
                    path: self.path.clone(),
                });
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let table: toml::Table = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let mut data = ProviderData::new();
        for (key, value) in &table {
            flatten_value(&normalize_key(key), value, &mut data);
        }
        Ok(data)
    }
}

fn flatten_value(key: &str, value: &toml::Value, data: &mut ProviderData) {
    match value {
        toml::Value::Table(table) => {
            for (child, value) in table {
                flatten_value(&combine_key(key, &normalize_key(child)), value, data);
            }
        }
        toml::Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                flatten_value(&combine_key(key, &index.to_string()), value, data);
            }
        }
        toml::Value::String(text) => {
            data.insert(key.to_owned(), text.clone());
        }
        toml::Value::Integer(number) => {
            data.insert(key.to_owned(), number.to_string());
        }
        toml::Value::Float(number) => {
            data.insert(key.to_owned(), number.to_string());
        }
        toml::Value::Boolean(flag) => {
            data.insert(key.to_owned(), flag.to_string());
        }
        toml::Value::Datetime(datetime) => {
            data.insert(key.to_owned(), datetime.to_string());
        }
    }
}
