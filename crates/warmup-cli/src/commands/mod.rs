//! CLI command definitions and dispatch.

pub mod device;
pub mod migrate;
pub mod sweep;
pub mod task;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use warmup_core::config::AppConfig;
use warmup_core::error::AppError;
use warmup_core::traits::{EventPublisher, NoopPublisher};
use warmup_database::Persistence;
use warmup_service::{DeviceService, TaskLifecycleManager};

/// Warmup: task dispatch backend for a fleet of Android devices
#[derive(Debug, Parser)]
#[command(name = "warmup-cli", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file (extension optional)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded from config/{env}
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Task management
    Task(task::TaskArgs),
    /// Device management
    Device(device::DeviceArgs),
    /// Run maintenance sweeps by hand
    Sweep(sweep::SweepArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = load_config(&self.config, &self.env)?;
        match &self.command {
            Commands::Migrate => migrate::execute(&config).await,
            Commands::Task(args) => task::execute(args, &config, self.format).await,
            Commands::Device(args) => device::execute(args, &config, self.format).await,
            Commands::Sweep(args) => sweep::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: load configuration from the base file plus environment overlay
pub fn load_config(base: &str, env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(base, env)
}

/// Services wired the way the server wires them, minus event fan-out.
pub struct Services {
    pub persistence: Persistence,
    pub tasks: Arc<TaskLifecycleManager>,
    pub devices: Arc<DeviceService>,
}

impl Services {
    /// Release the backend.
    pub async fn close(self) {
        self.persistence.close().await;
    }
}

/// Helper: open persistence and build the services on top of it
pub async fn open_services(config: &AppConfig) -> Result<Services, AppError> {
    let persistence = Persistence::open(&config.database).await?;
    let publisher: Arc<dyn EventPublisher> = Arc::new(NoopPublisher);
    let devices = Arc::new(DeviceService::new(
        Arc::clone(&persistence.devices),
        Arc::clone(&publisher),
    ));
    let tasks = Arc::new(TaskLifecycleManager::new(
        Arc::clone(&persistence.tasks),
        devices.clone(),
        publisher,
        config.tasks.clone(),
    ));
    Ok(Services {
        persistence,
        tasks,
        devices,
    })
}
