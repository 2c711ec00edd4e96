//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use warmup_core::types::pagination::PageResponse;
use warmup_entity::device::Device;
use warmup_entity::task::Task;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One task as a table row.
#[derive(Debug, Serialize, Tabled)]
pub struct TaskRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Device")]
    pub device_id: String,
    #[tabled(rename = "Type")]
    pub task_type: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Priority")]
    pub priority: String,
    #[tabled(rename = "Retries")]
    pub retries: String,
    #[tabled(rename = "Scheduled")]
    pub scheduled_at: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            device_id: task.device_id.to_string(),
            task_type: task.task_type.to_string(),
            status: task.status.to_string(),
            priority: task.priority.to_string(),
            retries: format!("{}/{}", task.retry_count, task.max_retries),
            scheduled_at: task.scheduled_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// One device as a table row.
#[derive(Debug, Serialize, Tabled)]
pub struct DeviceRow {
    #[tabled(rename = "Device")]
    pub device_id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Online")]
    pub online: String,
    #[tabled(rename = "Last Seen")]
    pub last_seen: String,
}

impl From<&Device> for DeviceRow {
    fn from(device: &Device) -> Self {
        Self {
            device_id: device.device_id.to_string(),
            name: device.name.clone().unwrap_or_else(|| "-".to_string()),
            online: if device.is_online { "yes" } else { "no" }.to_string(),
            last_seen: device.last_seen.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Print one page of rows followed by a page footer in table mode.
pub fn print_page<S, T>(page: &PageResponse<S>, format: OutputFormat)
where
    T: Serialize + Tabled + for<'a> From<&'a S>,
{
    let rows: Vec<T> = page.items.iter().map(T::from).collect();
    print_list(&rows, format);
    if format == OutputFormat::Table {
        println!(
            "Page {} of {} ({} total)",
            page.page, page.total_pages, page.total_items
        );
    }
}

/// Print a single item in the selected format
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("{:#?}", item);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use warmup_core::types::id::DeviceId;
    use warmup_entity::task::{CreateTask, TaskPriority, TaskType};

    #[test]
    fn test_task_row_shows_retry_budget() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let task = Task::new(
            CreateTask {
                device_id: DeviceId::parse("phone-1").unwrap(),
                task_type: TaskType::WarmupCycle,
                parameters: serde_json::json!({}),
                priority: TaskPriority::High,
                max_retries: 3,
            },
            now,
        );
        let row = TaskRow::from(&task);
        assert_eq!(row.retries, "0/3");
        assert_eq!(row.status, "pending");
        assert_eq!(row.priority, "high");
        assert_eq!(row.scheduled_at, "2026-03-01 12:00:00");
    }

    #[test]
    fn test_device_row_placeholder_name() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let device = Device::register(DeviceId::parse("phone-2").unwrap(), None, now);
        let row = DeviceRow::from(&device);
        assert_eq!(row.name, "-");
        assert_eq!(row.online, "yes");
    }
}
