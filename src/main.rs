// ABOUTME: Entry point for the redis-operator CLI application.
// ABOUTME: Parses arguments, sets up tracing, and dispatches to command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use redis_operator::config::{self, Config, Settings};
use redis_operator::controller::{Controller, Dispatcher, Event};
use redis_operator::error::{Error, Result};
use redis_operator::output::{Output, OutputMode};
use redis_operator::platform::{ConfigSource, ConfigImageResolver, HookTools, ImageResolver};
use redis_operator::podspec::PodSpecBuilder;
use redis_operator::probe::TcpProbe;
use redis_operator::store::{AppliedSpec, FileStore, StateStore};
use redis_operator::types::{AppName, UnitName, WorkloadIdentity, sort_by_ordinal};
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    let settings = match load_settings(cli.settings.as_ref()) {
        Ok(settings) => settings,
        Err(e) => {
            output.error(&e.to_string());
            std::process::exit(1);
        }
    };

    // Logs go to stderr so stdout stays parseable.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    output.start_timer();
    if let Err(e) = run(cli.command, settings, &output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load(path)?,
        None => Settings::discover_or_default(&env::current_dir()?)?,
    };
    settings.with_env_overrides()
}

/// Workload configuration for this invocation. A failed fetch leaves it
/// empty: configure handlers then report it as invalid, and every other
/// handler runs without it.
async fn workload_config(path: Option<&Path>, tools: &HookTools) -> Config {
    let fetched = match path {
        Some(path) => Config::load(path),
        None => tools.config().await.map_err(Error::from),
    };
    fetched.unwrap_or_else(|e| {
        tracing::warn!("Cannot read workload configuration: {}", e);
        Config::new()
    })
}

async fn run(command: Commands, settings: Settings, output: &Output) -> Result<()> {
    match command {
        Commands::Init { app, force } => {
            let cwd = env::current_dir()?;
            config::init_settings(&cwd, app.as_deref(), force)?;
            output.success(&format!("Created {}", config::SETTINGS_FILENAME));
            Ok(())
        }
        Commands::Handle {
            event,
            config,
            tools_dir,
        } => {
            let identity = settings.identity()?;
            let mut tools = HookTools::new(settings.tool_timeout);
            if let Some(dir) = &tools_dir {
                tools = tools.with_tools_dir(dir);
            }

            let workload = workload_config(config.as_deref(), &tools).await;

            output.progress(&format!("Handling {event} for {}", identity.name));
            let controller = Controller::new(
                identity,
                workload.clone(),
                tools,
                FileStore::new(&settings.state_file),
                TcpProbe::new(settings.probe_timeout),
            );
            let report = Dispatcher::new(controller)
                .dispatch(Event::from_kind(event, workload))
                .await?;
            output.report(&report);
            Ok(())
        }
        Commands::Render { image, app, peers } => {
            let name = match app {
                Some(app) => AppName::new(&app).map_err(|e| Error::InvalidConfig(e.to_string()))?,
                None => settings.app.clone().ok_or(Error::MissingAppName)?,
            };
            let identity = WorkloadIdentity::new(name, settings.port);

            let mut units = peers
                .iter()
                .map(|peer| UnitName::parse(peer))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::InvalidConfig(e.to_string()))?;
            sort_by_ordinal(&mut units);

            let image = ConfigImageResolver
                .resolve(&image)
                .await
                .map_err(|e| Error::InvalidConfig(e.to_string()))?;
            let (spec, resources) = PodSpecBuilder::new(&identity, &image, &units).build();
            output.document(&AppliedSpec { spec, resources });
            Ok(())
        }
        Commands::State => {
            let state = FileStore::new(&settings.state_file).load().await?;
            output.document(&state);
            Ok(())
        }
    }
}
