use std::convert::Infallible;

use host_bootstrap::config::{ConfigurationManager, MemoryProvider};
use host_bootstrap::{
    BootstrapHostBuilder, DefaultServiceProviderFactory, HostBuilder, HostBuilderContext,
    HostBuilderError, HostEnvironment, ServiceCollection,
};
use host_bootstrap_test_support::{CallLog, CountingProvider};

type HostFn = fn(&mut ConfigurationManager) -> Result<(), HostBuilderError>;
type AppFn = fn(&mut HostBuilderContext, &mut ConfigurationManager) -> Result<(), HostBuilderError>;

fn builder_with_counter(log: &CallLog) -> BootstrapHostBuilder {
    let mut configuration = ConfigurationManager::new();
    configuration.add_provider(CountingProvider::new("recompute", log));
    BootstrapHostBuilder::new(configuration, HostEnvironment::default())
}

fn record_host(
    log: &CallLog,
    label: &'static str,
) -> impl FnOnce(&mut ConfigurationManager) -> Result<(), HostBuilderError> + 'static {
    let log = log.clone();
    move |_config: &mut ConfigurationManager| {
        log.push(label);
        Ok(())
    }
}

fn record_app(
    log: &CallLog,
    label: &'static str,
) -> impl FnOnce(&mut HostBuilderContext, &mut ConfigurationManager) -> Result<(), HostBuilderError>
       + 'static {
    let log = log.clone();
    move |_context: &mut HostBuilderContext, _config: &mut ConfigurationManager| {
        log.push(label);
        Ok(())
    }
}

#[test]
fn host_callbacks_run_in_registration_order_before_app_callbacks() {
    let log = CallLog::new();
    let mut builder = builder_with_counter(&log);

    builder
        .configure_app_configuration(Some(record_app(&log, "app-1")))
        .expect("register app-1")
        .configure_host_configuration(Some(record_host(&log, "host-1")))
        .expect("register host-1")
        .configure_app_configuration(Some(record_app(&log, "app-2")))
        .expect("register app-2")
        .configure_host_configuration(Some(record_host(&log, "host-2")))
        .expect("register host-2");

    builder.execute().expect("execute");

    assert_eq!(
        log.entries(),
        vec!["host-1", "host-2", "recompute", "app-1", "app-2", "recompute"]
    );
}

#[test]
fn recompute_runs_exactly_twice_even_without_callbacks() {
    let log = CallLog::new();
    let mut builder = builder_with_counter(&log);

    builder.execute().expect("execute");
    assert_eq!(log.count("recompute"), 2);
}

#[test]
fn environment_refresh_follows_each_recompute() {
    let log = CallLog::new();
    let mut builder = BootstrapHostBuilder::default();

    builder
        .configure_host_configuration(Some(|config: &mut ConfigurationManager| {
            config.add_in_memory([("environment", "Staging")]);
            Ok(())
        }))
        .expect("register host");

    let observed = log.clone();
    builder
        .configure_app_configuration(Some(
            move |context: &mut HostBuilderContext, config: &mut ConfigurationManager| {
                observed.push(context.environment().environment_name.clone());
                let configured = context.configuration().get("environment").unwrap_or("");
                observed.push(configured.to_owned());
                config.add_in_memory([("environment", "Development")]);
                Ok(())
            },
        ))
        .expect("register app");

    builder.execute().expect("execute");

    assert_eq!(log.entries(), vec!["Staging", "Staging"]);
    assert!(builder.environment().is_development());
    assert_eq!(
        builder.context().configuration().get("environment"),
        Some("Development")
    );
}

#[test]
fn absent_callbacks_are_rejected_without_registration() {
    let mut builder = BootstrapHostBuilder::default();
    builder
        .configure_host_configuration(Some(|_: &mut ConfigurationManager| Ok(())))
        .expect("register host");

    let err = builder
        .configure_host_configuration(None::<HostFn>)
        .expect_err("absent host callback");
    assert!(matches!(
        err,
        HostBuilderError::InvalidArgument {
            parameter: "configure"
        }
    ));

    let err = builder
        .configure_app_configuration(None::<AppFn>)
        .expect_err("absent app callback");
    assert!(matches!(err, HostBuilderError::InvalidArgument { .. }));

    assert_eq!(builder.host_action_count(), 1);
    assert_eq!(builder.app_action_count(), 0);
}

#[test]
fn build_always_fails() {
    let mut builder = BootstrapHostBuilder::default();
    let err: Result<Infallible, _> = builder.build();
    assert!(matches!(err, Err(HostBuilderError::InvalidOperation { .. })));

    builder
        .configure_host_configuration(Some(|_: &mut ConfigurationManager| Ok(())))
        .expect("register host");
    builder.execute().expect("execute");
    assert!(matches!(
        builder.build(),
        Err(HostBuilderError::InvalidOperation { .. })
    ));
}

#[test]
fn dropped_registrations_return_the_same_builder() {
    let log = CallLog::new();
    let mut builder = BootstrapHostBuilder::default();
    let original: *const BootstrapHostBuilder = &builder;

    let services_log = log.clone();
    let returned: *const BootstrapHostBuilder = builder
        .configure_services(
            move |_: &HostBuilderContext, services: &mut ServiceCollection| {
                services_log.push("services");
                Ok(())
            },
        )
        .expect("services");
    assert_eq!(returned, original);

    let container_log = log.clone();
    let returned: *const BootstrapHostBuilder = builder
        .configure_container(move |_: &HostBuilderContext, _container: &mut Vec<String>| {
            container_log.push("container");
            Ok(())
        })
        .expect("container");
    assert_eq!(returned, original);

    let returned: *const BootstrapHostBuilder = builder
        .use_service_provider_factory(DefaultServiceProviderFactory::new(false))
        .expect("factory");
    assert_eq!(returned, original);

    let factory_log = log.clone();
    let returned: *const BootstrapHostBuilder = builder
        .use_service_provider_factory_with(move |_: &HostBuilderContext| {
            factory_log.push("factory");
            DefaultServiceProviderFactory::new(true)
        })
        .expect("factory with context");
    assert_eq!(returned, original);

    assert_eq!(builder.host_action_count(), 0);
    assert_eq!(builder.app_action_count(), 0);

    builder.execute().expect("execute");
    assert!(log.entries().is_empty());
}

#[test]
fn staging_host_setting_selects_environment_specific_source() {
    let mut builder = BootstrapHostBuilder::default();

    builder
        .configure_host_configuration(Some(|config: &mut ConfigurationManager| {
            config.add_in_memory([("ENVIRONMENT", "staging"), ("host:marker", "host")]);
            Ok(())
        }))
        .expect("register host")
        .configure_app_configuration(Some(
            |context: &mut HostBuilderContext, config: &mut ConfigurationManager| {
                let name = context.environment().environment_name.clone();
                if name != "staging" {
                    return Err(HostBuilderError::callback(format!(
                        "expected staging environment, found {name}"
                    )));
                }
                let file = format!("settings.{name}.ext");
                config.add_provider(MemoryProvider::new([("app:source", file)]));
                Ok(())
            },
        ))
        .expect("register app");

    builder.execute().expect("execute");

    let configuration = builder.configuration();
    assert_eq!(configuration.get("host:marker"), Some("host"));
    assert_eq!(configuration.get("app:source"), Some("settings.staging.ext"));
    assert_eq!(builder.environment().environment_name, "staging");
}

#[test]
fn later_app_callback_overrides_earlier_one() {
    let mut builder = BootstrapHostBuilder::default();

    builder
        .configure_app_configuration(Some(
            |_: &mut HostBuilderContext, config: &mut ConfigurationManager| {
                config.add_in_memory([("greeting", "from-a")]);
                Ok(())
            },
        ))
        .expect("register a")
        .configure_app_configuration(Some(
            |_: &mut HostBuilderContext, config: &mut ConfigurationManager| {
                config.add_in_memory([("greeting", "from-b")]);
                Ok(())
            },
        ))
        .expect("register b");

    builder.execute().expect("execute");
    assert_eq!(builder.configuration().get("greeting"), Some("from-b"));
}

#[test]
fn callback_error_aborts_remaining_steps() {
    let log = CallLog::new();
    let mut builder = builder_with_counter(&log);

    builder
        .configure_host_configuration(Some(record_host(&log, "host-1")))
        .expect("register host-1")
        .configure_host_configuration(Some(|_: &mut ConfigurationManager| {
            Err(HostBuilderError::callback("boom"))
        }))
        .expect("register failing host")
        .configure_host_configuration(Some(record_host(&log, "host-3")))
        .expect("register host-3")
        .configure_app_configuration(Some(record_app(&log, "app-1")))
        .expect("register app-1");

    let err = builder.execute().expect_err("callback failure");
    assert_eq!(err.to_string(), "configuration callback failed: boom");
    assert_eq!(log.entries(), vec!["host-1"]);
}

#[test]
fn recompute_failure_propagates_before_app_callbacks() {
    let log = CallLog::new();
    let mut builder = BootstrapHostBuilder::default();

    builder
        .configure_host_configuration(Some(|config: &mut ConfigurationManager| {
            config.add_command_line(["--environment"]);
            Ok(())
        }))
        .expect("register host")
        .configure_app_configuration(Some(record_app(&log, "app-1")))
        .expect("register app");

    let err = builder.execute().expect_err("bad command line");
    assert!(matches!(err, HostBuilderError::Configuration(_)));
    assert!(log.entries().is_empty());
}

#[test]
fn property_bag_carries_values_between_callbacks() {
    let log = CallLog::new();
    let mut builder = BootstrapHostBuilder::default();
    builder.properties_mut().insert("seed", 41u32);

    let observed = log.clone();
    builder
        .configure_app_configuration(Some(
            |context: &mut HostBuilderContext, _: &mut ConfigurationManager| {
                if let Some(seed) = context.properties_mut().get_mut::<u32>("seed") {
                    *seed += 1;
                }
                Ok(())
            },
        ))
        .expect("register first")
        .configure_app_configuration(Some(
            move |context: &mut HostBuilderContext, _: &mut ConfigurationManager| {
                let seed = context.properties().get::<u32>("seed").copied();
                observed.push(format!("{seed:?}"));
                Ok(())
            },
        ))
        .expect("register second");

    builder.execute().expect("execute");
    assert_eq!(log.entries(), vec!["Some(42)"]);

    let parts = builder.into_parts();
    assert_eq!(parts.properties.get::<u32>("seed"), Some(&42));
}
