use std::fmt;

use host_bootstrap_config::ConfigurationManager;

use crate::{HostBuilderContext, HostBuilderError, Properties};

/// Host-scope configuration callback.
pub type HostConfigureAction =
    Box<dyn FnOnce(&mut ConfigurationManager) -> Result<(), HostBuilderError>>;

/// App-scope configuration callback.
pub type AppConfigureAction = Box<
    dyn FnOnce(&mut HostBuilderContext, &mut ConfigurationManager) -> Result<(), HostBuilderError>,
>;

/// Registration surface shared by the bootstrap stand-in and real host
/// builders.
///
/// Startup code written against this trait runs unchanged against either.
/// Registration methods return `&mut Self` so calls can be chained with `?`.
pub trait HostBuilder {
    /// What [`build`](Self::build) produces.
    type Host;

    fn properties(&self) -> &Properties;

    fn properties_mut(&mut self) -> &mut Properties;

    /// Registers a callback that adds host-level configuration sources.
    ///
    /// `None` fails with [`HostBuilderError::InvalidArgument`].
    fn configure_host_configuration<F>(
        &mut self,
        configure: Option<F>,
    ) -> Result<&mut Self, HostBuilderError>
    where
        F: FnOnce(&mut ConfigurationManager) -> Result<(), HostBuilderError> + 'static;

    /// Registers a callback that adds application configuration sources.
    ///
    /// `None` fails with [`HostBuilderError::InvalidArgument`].
    fn configure_app_configuration<F>(
        &mut self,
        configure: Option<F>,
    ) -> Result<&mut Self, HostBuilderError>
    where
        F: FnOnce(&mut HostBuilderContext, &mut ConfigurationManager) -> Result<(), HostBuilderError>
            + 'static;

    fn configure_services<F>(&mut self, configure: F) -> Result<&mut Self, HostBuilderError>
    where
        F: FnOnce(&HostBuilderContext, &mut ServiceCollection) -> Result<(), HostBuilderError>
            + 'static;

    fn configure_container<C, F>(&mut self, configure: F) -> Result<&mut Self, HostBuilderError>
    where
        C: 'static,
        F: FnOnce(&HostBuilderContext, &mut C) -> Result<(), HostBuilderError> + 'static;

    fn use_service_provider_factory<P>(&mut self, factory: P) -> Result<&mut Self, HostBuilderError>
    where
        P: ServiceProviderFactory + 'static;

    /// Like [`use_service_provider_factory`](Self::use_service_provider_factory),
    /// but the factory is created from the builder context once it exists.
    fn use_service_provider_factory_with<P, F>(
        &mut self,
        factory: F,
    ) -> Result<&mut Self, HostBuilderError>
    where
        P: ServiceProviderFactory + 'static,
        F: FnOnce(&HostBuilderContext) -> P + 'static;

    fn build(&mut self) -> Result<Self::Host, HostBuilderError>;
}

/// Lifetime of a registered service.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ServiceLifetime {
    Singleton,
    Scoped,
    Transient,
}

impl fmt::Display for ServiceLifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServiceLifetime::Singleton => "singleton",
            ServiceLifetime::Scoped => "scoped",
            ServiceLifetime::Transient => "transient",
        };
        f.write_str(label)
    }
}

/// A named service registration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub lifetime: ServiceLifetime,
}

/// Ordered service registrations handed to a service-provider factory.
#[derive(Clone, Debug, Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, lifetime: ServiceLifetime) -> &mut Self {
        self.descriptors.push(ServiceDescriptor {
            name: name.into(),
            lifetime,
        });
        self
    }

    pub fn add_singleton(&mut self, name: impl Into<String>) -> &mut Self {
        self.add(name, ServiceLifetime::Singleton)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors
            .iter()
            .any(|descriptor| descriptor.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Turns service registrations into a container-specific builder and then
/// into a provider.
pub trait ServiceProviderFactory {
    type ContainerBuilder;
    type Provider;

    fn create_builder(&self, services: ServiceCollection) -> Self::ContainerBuilder;

    fn create_service_provider(&self, builder: Self::ContainerBuilder) -> Self::Provider;
}

/// Pass-through factory whose only setting is whether scope validation is on.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DefaultServiceProviderFactory {
    pub validate_scopes: bool,
}

impl DefaultServiceProviderFactory {
    pub fn new(validate_scopes: bool) -> Self {
        DefaultServiceProviderFactory { validate_scopes }
    }
}

impl ServiceProviderFactory for DefaultServiceProviderFactory {
    type ContainerBuilder = ServiceCollection;
    type Provider = ServiceCollection;

    fn create_builder(&self, services: ServiceCollection) -> ServiceCollection {
        services
    }

    fn create_service_provider(&self, builder: ServiceCollection) -> ServiceCollection {
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_collection_keeps_registration_order() {
        let mut services = ServiceCollection::new();
        services
            .add_singleton("logging")
            .add("request-scope", ServiceLifetime::Scoped);

        let names: Vec<_> = services.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["logging", "request-scope"]);
        assert!(services.contains("logging"));
        assert_eq!(services.len(), 2);
    }

    #[test]
    fn default_factory_passes_services_through() {
        let factory = DefaultServiceProviderFactory::new(true);
        let mut services = ServiceCollection::new();
        services.add_singleton("logging");

        let provider = factory.create_service_provider(factory.create_builder(services));
        assert!(provider.contains("logging"));
        assert!(factory.validate_scopes);
    }
}
