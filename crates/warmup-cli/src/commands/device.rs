//! Device management commands.

use clap::{Args, Subcommand};

use crate::output::{self, DeviceRow, OutputFormat};
use warmup_core::config::AppConfig;
use warmup_core::error::AppError;
use warmup_core::types::pagination::PageRequest;

/// Arguments for device commands
#[derive(Debug, Args)]
pub struct DeviceArgs {
    /// Device subcommand
    #[command(subcommand)]
    pub command: DeviceCommand,
}

/// Device subcommands
#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// List registered devices
    List {
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 25)]
        page_size: u64,
    },
}

/// Execute device commands
pub async fn execute(
    args: &DeviceArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::open_services(config).await?;

    let outcome = match &args.command {
        DeviceCommand::List { page, page_size } => services
            .devices
            .list(&PageRequest::new(*page, *page_size))
            .await
            .map(|page| output::print_page::<_, DeviceRow>(&page, format)),
    };

    services.close().await;
    outcome
}
