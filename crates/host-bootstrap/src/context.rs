use host_bootstrap_config::Configuration;

use crate::{HostEnvironment, Properties};

/// State handed to app-scope configuration callbacks.
///
/// The environment and configuration are read-only here and reflect the most
/// recent refresh; the property bag is writable so callbacks can pass values
/// forward.
#[derive(Debug, Default)]
pub struct HostBuilderContext {
    environment: HostEnvironment,
    configuration: Configuration,
    properties: Properties,
}

impl HostBuilderContext {
    pub fn new(environment: HostEnvironment) -> Self {
        HostBuilderContext {
            environment,
            configuration: Configuration::default(),
            properties: Properties::new(),
        }
    }

    pub fn environment(&self) -> &HostEnvironment {
        &self.environment
    }

    /// Merged configuration as of the last refresh.
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    pub(crate) fn refresh(&mut self, configuration: &Configuration) {
        self.configuration = configuration.clone();
        self.environment.apply_configuration(configuration);
    }

    pub(crate) fn into_parts(self) -> (HostEnvironment, Properties) {
        (self.environment, self.properties)
    }
}
