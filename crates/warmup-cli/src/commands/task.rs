//! Task management commands.

use chrono::{Duration, Utc};
use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat, TaskRow};
use warmup_core::config::AppConfig;
use warmup_core::error::AppError;
use warmup_core::types::id::{DeviceId, TaskId};
use warmup_core::types::pagination::PageRequest;
use warmup_entity::task::{TaskFilter, TaskStatus};
use warmup_service::NewTask;

/// Arguments for task commands
#[derive(Debug, Args)]
pub struct TaskArgs {
    /// Task subcommand
    #[command(subcommand)]
    pub command: TaskCommand,
}

/// Task subcommands
#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Queue a task for a device
    Create {
        /// Target device id
        #[arg(short, long)]
        device: String,
        /// Task type, e.g. warmup_cycle
        #[arg(short = 't', long = "type")]
        task_type: String,
        /// low, normal, high or urgent
        #[arg(short, long)]
        priority: Option<String>,
        /// Retry cap
        #[arg(long)]
        max_retries: Option<i32>,
        /// Parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
    },
    /// List tasks, newest first
    List {
        /// Only tasks for this device
        #[arg(short, long)]
        device: Option<String>,
        /// Only tasks in this status
        #[arg(short, long)]
        status: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 25)]
        page_size: u64,
    },
    /// Show one task
    Get {
        /// Task id
        id: String,
    },
    /// Put a failed task back in the queue
    Retry {
        /// Task id
        id: String,
    },
    /// Delete old finished tasks
    Purge {
        /// Age threshold in days
        #[arg(long, default_value_t = 30)]
        older_than_days: i64,
        /// Statuses to delete (repeatable); defaults to completed and failed
        #[arg(long)]
        status: Vec<String>,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Task counts per status
    Stats {
        /// Only tasks for this device
        #[arg(short, long)]
        device: Option<String>,
    },
}

/// Execute task commands
pub async fn execute(
    args: &TaskArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::open_services(config).await?;
    let tasks = &services.tasks;

    let outcome = match &args.command {
        TaskCommand::Create {
            device,
            task_type,
            priority,
            max_retries,
            params,
        } => {
            let parameters = params
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .map_err(|e| AppError::invalid_argument(format!("Invalid --params JSON: {e}")))?;
            let input = NewTask {
                device_id: device.clone(),
                task_type: task_type.clone(),
                parameters,
                priority: priority.clone(),
                max_retries: *max_retries,
            };
            tasks.create(input).await.map(|task| {
                output::print_success(&format!("Task {} queued for {}", task.id, task.device_id));
                output::print_item(&task, format);
            })
        }
        TaskCommand::List {
            device,
            status,
            page,
            page_size,
        } => {
            let filter = build_filter(device.as_deref(), status.as_deref())?;
            tasks
                .list(&filter, &PageRequest::new(*page, *page_size))
                .await
                .map(|page| output::print_page::<_, TaskRow>(&page, format))
        }
        TaskCommand::Get { id } => {
            let id: TaskId = id.parse()?;
            tasks.get(id).await.map(|task| output::print_item(&task, format))
        }
        TaskCommand::Retry { id } => {
            let id: TaskId = id.parse()?;
            tasks.retry(id).await.map(|task| {
                output::print_success(&format!("Task {} is pending again", task.id));
                output::print_item(&task, format);
            })
        }
        TaskCommand::Purge {
            older_than_days,
            status,
            yes,
        } => {
            let statuses = parse_statuses(status)?;
            if !*yes && !confirm_purge(*older_than_days, &statuses)? {
                println!("Cancelled.");
                services.close().await;
                return Ok(());
            }
            let older_than = Utc::now() - Duration::days(*older_than_days);
            tasks.purge(older_than, &statuses).await.map(|deleted| {
                output::print_success(&format!("Deleted {deleted} task(s)"));
            })
        }
        TaskCommand::Stats { device } => tasks.stats(device.as_deref()).await.map(|stats| {
            match format {
                OutputFormat::Json => output::print_item(&stats, format),
                OutputFormat::Table => {
                    output::print_kv("Pending", &stats.pending.to_string());
                    output::print_kv("Running", &stats.running.to_string());
                    output::print_kv("Completed", &stats.completed.to_string());
                    output::print_kv("Failed", &stats.failed.to_string());
                    output::print_kv("Total", &stats.total().to_string());
                }
            }
        }),
    };

    services.close().await;
    outcome
}

fn build_filter(device: Option<&str>, status: Option<&str>) -> Result<TaskFilter, AppError> {
    Ok(TaskFilter {
        device_id: device.map(DeviceId::parse).transpose()?,
        status: status.map(str::parse::<TaskStatus>).transpose()?,
    })
}

fn parse_statuses(raw: &[String]) -> Result<Vec<TaskStatus>, AppError> {
    if raw.is_empty() {
        return Ok(TaskStatus::TERMINAL.to_vec());
    }
    raw.iter().map(|s| s.parse()).collect()
}

fn confirm_purge(older_than_days: i64, statuses: &[TaskStatus]) -> Result<bool, AppError> {
    let names: Vec<&str> = statuses.iter().map(TaskStatus::as_str).collect();
    dialoguer::Confirm::new()
        .with_prompt(format!(
            "Delete {} tasks created more than {older_than_days} day(s) ago?",
            names.join("/")
        ))
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
