//! One-off execution of the scheduled sweeps.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use warmup_core::config::AppConfig;
use warmup_core::error::AppError;
use warmup_worker::SweepRegistry;

/// Arguments for sweep commands
#[derive(Debug, Args)]
pub struct SweepArgs {
    /// Sweep subcommand
    #[command(subcommand)]
    pub command: SweepCommand,
}

/// Sweep subcommands
#[derive(Debug, Subcommand)]
pub enum SweepCommand {
    /// Run a sweep once: stale_tasks, offline_devices or task_retention
    Run {
        /// Sweep name
        name: String,
    },
    /// List the available sweeps and their schedules
    List,
}

/// Execute sweep commands
pub async fn execute(
    args: &SweepArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::open_services(config).await?;
    let registry = SweepRegistry::with_defaults(
        &config.sweeper,
        services.tasks.clone(),
        services.devices.clone(),
    );

    let outcome = match &args.command {
        SweepCommand::Run { name } => registry.run(name).await.map(|summary| {
            output::print_success(&format!("Sweep '{name}' finished"));
            output::print_item(&summary, format);
        }),
        SweepCommand::List => {
            for job in registry.jobs() {
                output::print_kv(job.name(), job.schedule());
            }
            Ok(())
        }
    };

    services.close().await;
    outcome
}
