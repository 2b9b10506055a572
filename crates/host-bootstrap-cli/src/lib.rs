use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use host_bootstrap::{bootstrap, BootstrapParts, DefaultsOptions, DEFAULT_ENV_PREFIX};
use serde_json::json;
use tracing::Level;

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Show(args) => handle_show(args),
        Command::Get(args) => handle_get(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    // A subscriber may already be installed when run() is embedded.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

fn resolve(args: BootstrapArgs) -> Result<BootstrapParts> {
    let BootstrapArgs {
        content_root,
        env_prefix,
        app_args,
    } = args;

    let content_root = fs::canonicalize(&content_root)
        .with_context(|| format!("failed to resolve content root {}", content_root.display()))?;

    let options = DefaultsOptions::default()
        .with_content_root(content_root)
        .with_env_prefix(env_prefix)
        .with_args(app_args);

    Ok(bootstrap(&options)?)
}

fn handle_show(args: ShowArgs) -> Result<i32> {
    let ShowArgs {
        common,
        format,
        section,
    } = args;

    let parts = resolve(common)?;
    let configuration = match &section {
        Some(name) => parts.configuration.configuration().section(name),
        None => parts.configuration.configuration().clone(),
    };

    match format.unwrap_or(ShowFormatValue::Plain) {
        ShowFormatValue::Json => {
            let payload = json!({
                "environment": parts.environment,
                "configuration": configuration,
                "sources": parts.configuration.sources(),
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        ShowFormatValue::Plain => {
            let environment = &parts.environment;
            println!("environment: {}", environment.environment_name);
            println!("content root: {}", environment.content_root_path.display());
            if environment.application_name.is_empty() {
                println!("application: (unset)");
            } else {
                println!("application: {}", environment.application_name);
            }

            println!();
            println!("sources:");
            for source in parts.configuration.sources() {
                println!("  - {source}");
            }

            println!();
            println!("configuration:");
            for (key, value) in configuration.iter() {
                println!("  {key} = {value}");
            }
        }
    }

    Ok(0)
}

fn handle_get(args: GetArgs) -> Result<i32> {
    let GetArgs { key, common } = args;

    let parts = resolve(common)?;
    match parts.configuration.get(&key) {
        Some(value) => {
            println!("{value}");
            Ok(0)
        }
        None => {
            eprintln!("key '{key}' not found");
            Ok(1)
        }
    }
}

#[derive(Parser)]
#[command(
    name = "host-bootstrap",
    about = "Resolve host configuration the way application startup does"
)]
struct Cli {
    /// Log bootstrap phases to stderr
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved environment and configuration
    Show(ShowArgs),
    /// Print a single configuration value
    Get(GetArgs),
}

#[derive(Args)]
struct BootstrapArgs {
    /// Directory used as the initial content root
    #[arg(long = "content-root", value_name = "DIR", default_value = ".")]
    content_root: PathBuf,
    /// Prefix for environment variables read as host configuration
    #[arg(long = "env-prefix", value_name = "PREFIX", default_value = DEFAULT_ENV_PREFIX)]
    env_prefix: String,
    /// Arguments passed to the command-line configuration providers
    #[arg(last = true, value_name = "APP_ARGS")]
    app_args: Vec<String>,
}

#[derive(Args)]
struct ShowArgs {
    #[command(flatten)]
    common: BootstrapArgs,
    /// Output format (plain or json)
    #[arg(long, value_enum)]
    format: Option<ShowFormatValue>,
    /// Only show keys under this section
    #[arg(long, value_name = "NAME")]
    section: Option<String>,
}

#[derive(Args)]
struct GetArgs {
    /// Configuration key, segments separated by ':'
    #[arg(value_name = "KEY")]
    key: String,
    #[command(flatten)]
    common: BootstrapArgs,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShowFormatValue {
    Plain,
    Json,
}
