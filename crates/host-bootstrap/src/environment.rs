use std::path::{Path, PathBuf};

use host_bootstrap_config::Configuration;
use serde::Serialize;

/// Configuration keys read by [`HostEnvironment::apply_configuration`].
pub mod host_keys {
    pub const ENVIRONMENT: &str = "environment";
    pub const CONTENT_ROOT: &str = "contentRoot";
    pub const APPLICATION_NAME: &str = "applicationName";
}

/// Conventional environment names.
pub mod environment_names {
    pub const DEVELOPMENT: &str = "Development";
    pub const STAGING: &str = "Staging";
    pub const PRODUCTION: &str = "Production";
}

/// Environment-derived host settings.
///
/// Fields only change through [`apply_configuration`](Self::apply_configuration);
/// they reflect configuration as of the last call, never later edits.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct HostEnvironment {
    pub environment_name: String,
    pub content_root_path: PathBuf,
    pub application_name: String,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Default for HostEnvironment {
    fn default() -> Self {
        HostEnvironment::new(".")
    }
}

impl HostEnvironment {
    /// Creates a production environment rooted at `base_dir`.
    ///
    /// A relative `contentRoot` value resolves against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        HostEnvironment {
            environment_name: environment_names::PRODUCTION.to_owned(),
            content_root_path: base_dir.clone(),
            application_name: String::new(),
            base_dir,
        }
    }

    /// Re-derives fields from `configuration`. Absent or blank keys keep the
    /// current value.
    pub fn apply_configuration(&mut self, configuration: &Configuration) {
        if let Some(name) = non_blank(configuration, host_keys::APPLICATION_NAME) {
            self.application_name = name.to_owned();
        }
        if let Some(name) = non_blank(configuration, host_keys::ENVIRONMENT) {
            self.environment_name = name.to_owned();
        }
        if let Some(root) = non_blank(configuration, host_keys::CONTENT_ROOT) {
            self.content_root_path = resolve_path(Path::new(root), &self.base_dir);
        }
    }

    pub fn is_environment(&self, name: &str) -> bool {
        self.environment_name.eq_ignore_ascii_case(name)
    }

    pub fn is_development(&self) -> bool {
        self.is_environment(environment_names::DEVELOPMENT)
    }

    pub fn is_staging(&self) -> bool {
        self.is_environment(environment_names::STAGING)
    }

    pub fn is_production(&self) -> bool {
        self.is_environment(environment_names::PRODUCTION)
    }
}

fn non_blank<'a>(configuration: &'a Configuration, key: &str) -> Option<&'a str> {
    configuration
        .get(key)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
