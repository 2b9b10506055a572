use std::env;
use std::path::{Path, PathBuf};

use host_bootstrap_config::{ConfigurationManager, EnvironmentVariablesProvider, TomlFileProvider};

use crate::{
    host_keys, BootstrapHostBuilder, BootstrapParts, DefaultServiceProviderFactory, HostBuilder,
    HostBuilderContext, HostBuilderError, HostEnvironment, ServiceCollection,
};

/// Prefix for environment variables read as host configuration.
pub const DEFAULT_ENV_PREFIX: &str = "HOST_";

const SETTINGS_FILE_STEM: &str = "settings";

/// Inputs for [`configure_defaults`].
#[derive(Clone, Debug)]
pub struct DefaultsOptions {
    pub content_root: PathBuf,
    pub args: Vec<String>,
    pub env_prefix: String,
    /// Fixed environment variables; `None` reads the process environment.
    pub environment_variables: Option<Vec<(String, String)>>,
}

impl Default for DefaultsOptions {
    fn default() -> Self {
        DefaultsOptions {
            content_root: PathBuf::from("."),
            args: Vec::new(),
            env_prefix: DEFAULT_ENV_PREFIX.to_owned(),
            environment_variables: None,
        }
    }
}

impl DefaultsOptions {
    pub fn with_content_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.content_root = path.into();
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn with_environment_variables<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environment_variables = Some(
            variables
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    fn environment_provider(&self, prefix: Option<&str>) -> EnvironmentVariablesProvider {
        match &self.environment_variables {
            Some(variables) => {
                EnvironmentVariablesProvider::with_variables(prefix, variables.iter().cloned())
            }
            None => EnvironmentVariablesProvider::new(prefix),
        }
    }
}

/// Joins a relative `path` onto the current directory.
fn absolute_content_root(path: &Path) -> Result<PathBuf, HostBuilderError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let current = env::current_dir().map_err(|source| HostBuilderError::ContentRoot {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(current.join(path))
}

fn content_root_value(path: &Path) -> Result<String, HostBuilderError> {
    path.to_str()
        .map(str::to_owned)
        .ok_or_else(|| HostBuilderError::NonUtf8Path {
            path: path.to_path_buf(),
        })
}

/// Registers the standard configuration layering on any [`HostBuilder`].
///
/// Host scope, lowest precedence first: the content root from `options`
/// (made absolute against the current directory), prefixed environment
/// variables, command-line arguments.
///
/// App scope: `settings.toml` and `settings.{environment}.toml` under the
/// content root (both optional), unprefixed environment variables,
/// command-line arguments.
///
/// Also registers logging services and a service-provider factory that
/// validates scopes in development.
pub fn configure_defaults<B>(
    builder: &mut B,
    options: &DefaultsOptions,
) -> Result<(), HostBuilderError>
where
    B: HostBuilder,
{
    let content_root = content_root_value(&absolute_content_root(&options.content_root)?)?;
    let host_variables = options.environment_provider(Some(&options.env_prefix));
    let host_args = options.args.clone();

    let app_variables = options.environment_provider(None);
    let app_args = options.args.clone();

    builder
        .configure_host_configuration(Some(move |config: &mut ConfigurationManager| {
            config
                .add_in_memory([(host_keys::CONTENT_ROOT, content_root)])
                .add_provider(host_variables);
            if !host_args.is_empty() {
                config.add_command_line(host_args);
            }
            Ok(())
        }))?
        .configure_app_configuration(Some(
            move |context: &mut HostBuilderContext, config: &mut ConfigurationManager| {
                let environment = context.environment();
                let root = &environment.content_root_path;
                config
                    .add_provider(
                        TomlFileProvider::new(format!("{SETTINGS_FILE_STEM}.toml"))
                            .with_base_dir(root)
                            .optional(true),
                    )
                    .add_provider(
                        TomlFileProvider::new(format!(
                            "{SETTINGS_FILE_STEM}.{}.toml",
                            environment.environment_name
                        ))
                        .with_base_dir(root)
                        .optional(true),
                    )
                    .add_provider(app_variables);
                if !app_args.is_empty() {
                    config.add_command_line(app_args);
                }
                Ok(())
            },
        ))?
        .configure_services(
            |_context: &HostBuilderContext, services: &mut ServiceCollection| {
                services.add_singleton("logging");
                Ok(())
            },
        )?
        .use_service_provider_factory_with(|context: &HostBuilderContext| {
            DefaultServiceProviderFactory::new(context.environment().is_development())
        })?;

    Ok(())
}

/// Runs the default layering through a [`BootstrapHostBuilder`] and returns
/// the resolved configuration, environment and properties.
pub fn bootstrap(options: &DefaultsOptions) -> Result<BootstrapParts, HostBuilderError> {
    let base_dir = absolute_content_root(&options.content_root)?;
    let mut builder =
        BootstrapHostBuilder::new(ConfigurationManager::new(), HostEnvironment::new(base_dir));
    configure_defaults(&mut builder, options)?;
    builder.execute()?;
    Ok(builder.into_parts())
}
