//! Configuration bootstrap for hosts.
//!
//! Startup code is usually written against a full host builder
//! ([`HostBuilder`]), but the values that decide how that builder is set up
//! (environment name, content root, application name) live in configuration
//! that has to be read first. [`BootstrapHostBuilder`] stands in for the real
//! builder during that phase: it records configuration callbacks, drops
//! everything else, and runs the callbacks in two phases so that app-scope
//! sources are selected against the environment chosen by host-scope sources.

mod bootstrap;
mod builder;
mod context;
mod defaults;
mod environment;
mod error;
mod properties;

pub use bootstrap::{BootstrapHostBuilder, BootstrapParts};
pub use builder::{
    AppConfigureAction, DefaultServiceProviderFactory, HostBuilder, HostConfigureAction,
    ServiceCollection, ServiceDescriptor, ServiceLifetime, ServiceProviderFactory,
};
pub use context::HostBuilderContext;
pub use defaults::{bootstrap, configure_defaults, DefaultsOptions, DEFAULT_ENV_PREFIX};
pub use environment::{environment_names, host_keys, HostEnvironment};
pub use error::HostBuilderError;
pub use properties::Properties;

pub use host_bootstrap_config as config;
