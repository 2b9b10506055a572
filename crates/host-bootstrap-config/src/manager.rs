use std::fmt;
use std::path::PathBuf;

use tracing::{debug, trace};

use crate::{
    CommandLineProvider, ConfigError, ConfigSource, Configuration, ConfigurationProvider,
    EnvironmentVariablesProvider, MemoryProvider, ProviderData, TomlFileProvider,
};

/// Ordered set of providers plus the merged view from the last recompute.
///
/// Registration never loads anything. Call [`recompute`](Self::recompute)
/// once a batch of providers is in place; until then lookups keep answering
/// from the previous view.
#[derive(Default)]
pub struct ConfigurationManager {
    providers: Vec<Box<dyn ConfigurationProvider>>,
    view: Configuration,
}

impl fmt::Debug for ConfigurationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationManager")
            .field("provider_count", &self.providers.len())
            .field("key_count", &self.view.len())
            .finish()
    }
}

impl ConfigurationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a provider with the highest precedence so far.
    pub fn add_provider<P>(&mut self, provider: P) -> &mut Self
    where
        P: ConfigurationProvider + 'static,
    {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn add_in_memory<I, K, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.add_provider(MemoryProvider::new(values))
    }

    pub fn add_environment_variables(&mut self, prefix: Option<&str>) -> &mut Self {
        self.add_provider(EnvironmentVariablesProvider::new(prefix))
    }

    pub fn add_command_line<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_provider(CommandLineProvider::new(args))
    }

    pub fn add_toml_file(&mut self, path: impl Into<PathBuf>, optional: bool) -> &mut Self {
        self.add_provider(TomlFileProvider::new(path).optional(optional))
    }

    /// Drops every registered provider. The current view is left as is.
    pub fn clear_providers(&mut self) -> &mut Self {
        self.providers.clear();
        self
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Provider provenance in precedence order, lowest first.
    pub fn sources(&self) -> Vec<ConfigSource> {
        self.providers.iter().map(|provider| provider.source()).collect()
    }

    /// Loads every provider in order and replaces the merged view.
    ///
    /// On failure the previous view stays in place.
    pub fn recompute(&mut self) -> Result<(), ConfigError> {
        let mut merged = ProviderData::new();
        for provider in &self.providers {
            let data = provider.load()?;
            trace!(
                source = %provider.source(),
                keys = data.len(),
                "loaded configuration provider"
            );
            merged.extend(data);
        }

        debug!(
            providers = self.providers.len(),
            keys = merged.len(),
            "recomputed configuration"
        );
        self.view = Configuration::from_data(merged);
        Ok(())
    }

    /// Merged view as of the last recompute.
    pub fn configuration(&self) -> &Configuration {
        &self.view
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.view.get(key)
    }
}
