// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! zm - project progress, baseline and variance tracking

mod clock;
mod commands;
mod error;
mod output;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commands::{baseline, component, events, project, task, variance, Context};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::clock::CliClock;
use crate::error::CliError;
use crate::output::OutputFormat;
use zm_core::{Actor, EngineConfig, EventBus, EventLog, EventReceiver, UuidIdGen};
use zm_engine::{Engine, EngineDeps};
use zm_storage::Store;

#[derive(Parser)]
#[command(
    name = "zm",
    version,
    about = "Project progress rollup, baselines and variance"
)]
struct Cli {
    /// Directory holding the WAL and the event log
    #[arg(long, global = true, env = "ZM_STORE")]
    store: Option<PathBuf>,

    /// Engine configuration (defaults to <store>/zm.toml)
    #[arg(long, global = true, env = "ZM_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, global = true, env = "ZM_TENANT", default_value = "default")]
    tenant: String,

    #[arg(long, global = true, env = "ZM_ACTOR", default_value = "cli")]
    actor: String,

    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Pin today's date for variance calculations
    #[arg(long, global = true, env = "ZM_TODAY")]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project management
    #[command(subcommand)]
    Project(project::ProjectCommand),
    /// Component management
    #[command(subcommand)]
    Component(component::ComponentCommand),
    /// Task progress and status
    #[command(subcommand)]
    Task(task::TaskCommand),
    /// Recompute a project's rollup
    Rollup {
        /// Project ID
        project: String,
    },
    /// Baselines and re-baselining
    #[command(subcommand)]
    Baseline(baseline::BaselineCommand),
    /// Variance against a baseline
    Variance(variance::VarianceArgs),
    /// Read the event log
    Events(events::EventsArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("{}", CliError::from_anyhow(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let store_dir = match cli.store {
        Some(dir) => dir,
        None => default_store_dir()?,
    };
    // An explicit --config must exist; the store default is optional
    let config = match &cli.config {
        Some(path) => EngineConfig::load_required(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let path = store_dir.join("zm.toml");
            EngineConfig::load(&path).with_context(|| format!("loading {}", path.display()))?
        }
    };

    let store = Store::open_with_wait(&store_dir, config.engine.operation_timeout)
        .with_context(|| format!("opening store {}", store_dir.display()))?;

    let bus = EventBus::new();
    let mut audit = bus.set_global_handler();
    let engine = Engine::new(
        EngineDeps::new(store, bus),
        config,
        CliClock::new(cli.today),
        UuidIdGen,
    );
    let ctx = Context {
        engine,
        actor: Actor::new(cli.actor, cli.tenant),
        format: cli.format,
    };
    let log_path = store_dir.join("events.jsonl");

    let result = match cli.command {
        Commands::Project(command) => project::handle(&ctx, command).await,
        Commands::Component(command) => component::handle(&ctx, command).await,
        Commands::Task(command) => task::handle(&ctx, command).await,
        Commands::Rollup { project } => project::rollup(&ctx, project).await,
        Commands::Baseline(command) => baseline::handle(&ctx, command).await,
        Commands::Variance(args) => variance::handle(&ctx, args),
        Commands::Events(args) => events::handle(&ctx, &log_path, args),
    };

    // Record whatever was published, even when the command failed
    record_events(&log_path, &mut audit)?;
    result
}

fn record_events(path: &Path, rx: &mut EventReceiver) -> Result<()> {
    let mut log = EventLog::open(path.to_path_buf())
        .with_context(|| format!("opening event log {}", path.display()))?;
    let count = log.drain(rx)?;
    tracing::debug!(count, path = %path.display(), "recorded events");
    Ok(())
}

fn default_store_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join("zm"))
        .ok_or_else(|| anyhow::anyhow!("no local data directory; pass --store or set ZM_STORE"))
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("ZM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
