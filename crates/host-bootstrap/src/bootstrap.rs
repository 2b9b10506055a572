use std::convert::Infallible;
use std::fmt;
use std::mem;

use host_bootstrap_config::ConfigurationManager;
use tracing::debug;

use crate::{
    AppConfigureAction, HostBuilder, HostBuilderContext, HostBuilderError, HostConfigureAction,
    HostEnvironment, Properties, ServiceCollection, ServiceProviderFactory,
};

/// Throwaway [`HostBuilder`] that only resolves configuration.
///
/// Host-scope and app-scope configuration callbacks are recorded and run by
/// [`execute`](Self::execute). Service, container and service-provider-factory
/// registrations are accepted and dropped; the caller replays them on the real
/// builder once it exists. [`build`](HostBuilder::build) always fails.
///
/// Call `execute` exactly once, then take the results with
/// [`into_parts`](Self::into_parts).
pub struct BootstrapHostBuilder {
    configuration: ConfigurationManager,
    context: HostBuilderContext,
    host_actions: Vec<HostConfigureAction>,
    app_actions: Vec<AppConfigureAction>,
}

/// Configuration state resolved by [`BootstrapHostBuilder::execute`], used to
/// seed the real builder.
#[derive(Debug)]
pub struct BootstrapParts {
    pub configuration: ConfigurationManager,
    pub environment: HostEnvironment,
    pub properties: Properties,
}

impl fmt::Debug for BootstrapHostBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapHostBuilder")
            .field("configuration", &self.configuration)
            .field("environment", self.context.environment())
            .field("host_action_count", &self.host_actions.len())
            .field("app_action_count", &self.app_actions.len())
            .finish()
    }
}

impl Default for BootstrapHostBuilder {
    fn default() -> Self {
        BootstrapHostBuilder::new(ConfigurationManager::new(), HostEnvironment::default())
    }
}

impl BootstrapHostBuilder {
    pub fn new(configuration: ConfigurationManager, environment: HostEnvironment) -> Self {
        BootstrapHostBuilder {
            configuration,
            context: HostBuilderContext::new(environment),
            host_actions: Vec::new(),
            app_actions: Vec::new(),
        }
    }

    pub fn configuration(&self) -> &ConfigurationManager {
        &self.configuration
    }

    pub fn environment(&self) -> &HostEnvironment {
        self.context.environment()
    }

    pub fn context(&self) -> &HostBuilderContext {
        &self.context
    }

    pub fn host_action_count(&self) -> usize {
        self.host_actions.len()
    }

    pub fn app_action_count(&self) -> usize {
        self.app_actions.len()
    }

    /// Runs the recorded callbacks.
    ///
    /// 1. host-scope callbacks, in registration order
    /// 2. recompute the configuration and refresh the environment
    /// 3. app-scope callbacks, in registration order
    /// 4. recompute and refresh again
    ///
    /// The first error aborts the remaining steps. Changes already made to the
    /// configuration are not rolled back.
    pub fn execute(&mut self) -> Result<(), HostBuilderError> {
        debug!(
            callbacks = self.host_actions.len(),
            "running host configuration callbacks"
        );
        for configure in mem::take(&mut self.host_actions) {
            configure(&mut self.configuration)?;
        }

        // App sources may be picked by environment name, so the environment
        // has to reflect host sources before any app callback runs.
        self.refresh()?;

        debug!(
            callbacks = self.app_actions.len(),
            "running app configuration callbacks"
        );
        for configure in mem::take(&mut self.app_actions) {
            configure(&mut self.context, &mut self.configuration)?;
        }

        // App sources can still override environment keys.
        self.refresh()
    }

    pub fn into_parts(self) -> BootstrapParts {
        let (environment, properties) = self.context.into_parts();
        BootstrapParts {
            configuration: self.configuration,
            environment,
            properties,
        }
    }

    fn refresh(&mut self) -> Result<(), HostBuilderError> {
        self.configuration.recompute()?;
        self.context.refresh(self.configuration.configuration());
        debug!(
            environment = %self.context.environment().environment_name,
            content_root = %self.context.environment().content_root_path.display(),
            "refreshed host environment"
        );
        Ok(())
    }
}

impl HostBuilder for BootstrapHostBuilder {
    type Host = Infallible;

    fn properties(&self) -> &Properties {
        self.context.properties()
    }

    fn properties_mut(&mut self) -> &mut Properties {
        self.context.properties_mut()
    }

    fn configure_host_configuration<F>(
        &mut self,
        configure: Option<F>,
    ) -> Result<&mut Self, HostBuilderError>
    where
        F: FnOnce(&mut ConfigurationManager) -> Result<(), HostBuilderError> + 'static,
    {
        let configure = configure.ok_or(HostBuilderError::InvalidArgument {
            parameter: "configure",
        })?;
        self.host_actions.push(Box::new(configure));
        Ok(self)
    }

    fn configure_app_configuration<F>(
        &mut self,
        configure: Option<F>,
    ) -> Result<&mut Self, HostBuilderError>
    where
        F: FnOnce(&mut HostBuilderContext, &mut ConfigurationManager) -> Result<(), HostBuilderError>
            + 'static,
    {
        let configure = configure.ok_or(HostBuilderError::InvalidArgument {
            parameter: "configure",
        })?;
        self.app_actions.push(Box::new(configure));
        Ok(self)
    }

    fn configure_services<F>(&mut self, _configure: F) -> Result<&mut Self, HostBuilderError>
    where
        F: FnOnce(&HostBuilderContext, &mut ServiceCollection) -> Result<(), HostBuilderError>
            + 'static,
    {
        // Defaults register logging here during bootstrap. The real builder
        // receives the same registration when startup code is replayed on it.
        debug!("dropping service registration during bootstrap");
        Ok(self)
    }

    fn configure_container<C, F>(&mut self, _configure: F) -> Result<&mut Self, HostBuilderError>
    where
        C: 'static,
        F: FnOnce(&HostBuilderContext, &mut C) -> Result<(), HostBuilderError> + 'static,
    {
        // Honored by the real builder's configure_container on replay.
        debug!("dropping container registration during bootstrap");
        Ok(self)
    }

    fn use_service_provider_factory<P>(&mut self, _factory: P) -> Result<&mut Self, HostBuilderError>
    where
        P: ServiceProviderFactory + 'static,
    {
        // Honored by the real builder's use_service_provider_factory on replay.
        debug!("dropping service provider factory during bootstrap");
        Ok(self)
    }

    fn use_service_provider_factory_with<P, F>(
        &mut self,
        _factory: F,
    ) -> Result<&mut Self, HostBuilderError>
    where
        P: ServiceProviderFactory + 'static,
        F: FnOnce(&HostBuilderContext) -> P + 'static,
    {
        // Defaults install a scope-validating factory here. The real builder's
        // use_service_provider_factory_with honors it on replay.
        debug!("dropping service provider factory during bootstrap");
        Ok(self)
    }

    fn build(&mut self) -> Result<Infallible, HostBuilderError> {
        Err(HostBuilderError::InvalidOperation {
            message: "the bootstrap host builder only resolves configuration and cannot be built",
        })
    }
}
