//! Task repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use warmup_core::error::{AppError, ErrorKind};
use warmup_core::result::AppResult;
use warmup_core::types::id::{DeviceId, TaskId};
use warmup_core::types::pagination::{PageRequest, PageResponse};
use warmup_entity::task::{Task, TaskFilter, TaskStats, TaskStatus};

use crate::store::{RowVersion, TaskStore};

/// Urgent first, then oldest, then by time-ordered ID.
const DISPATCH_ORDER: &str = "CASE priority \
        WHEN 'urgent' THEN 0 WHEN 'high' THEN 1 WHEN 'normal' THEN 2 WHEN 'low' THEN 3 END, \
     created_at ASC, id ASC";

/// Task rows in PostgreSQL.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Create a new task repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::PersistenceUnavailable, message, e)
}

#[async_trait]
impl TaskStore for TaskRepository {
    async fn insert(&self, task: &Task) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO tasks (id, device_id, task_type, status, priority, parameters, result, \
             error_message, retry_count, max_retries, scheduled_at, started_at, completed_at, \
             created_at, updated_at, revision) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(task.id)
        .bind(&task.device_id)
        .bind(task.task_type)
        .bind(task.status)
        .bind(task.priority)
        .bind(&task.parameters)
        .bind(&task.result)
        .bind(&task.error_message)
        .bind(task.retry_count)
        .bind(task.max_retries)
        .bind(task.scheduled_at)
        .bind(task.started_at)
        .bind(task.completed_at)
        .bind(task.created_at)
        .bind(task.updated_at)
        .bind(task.revision)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to insert task"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find task"))
    }

    async fn find_dispatchable(
        &self,
        device_id: &DeviceId,
        now: DateTime<Utc>,
        limit: u32,
    ) -> AppResult<Vec<Task>> {
        let sql = format!(
            "SELECT * FROM tasks \
             WHERE device_id = $1 AND status = 'pending' AND scheduled_at <= $2 \
             ORDER BY {DISPATCH_ORDER} LIMIT $3"
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(device_id)
            .bind(now)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to find dispatchable tasks"))
    }

    async fn update_if(&self, task: &Task, expected: RowVersion) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET status = $4, result = $5, error_message = $6, retry_count = $7, \
             scheduled_at = $8, started_at = $9, completed_at = $10, updated_at = $11, \
             revision = revision + 1 \
             WHERE id = $1 AND status = $2 AND revision = $3 \
             RETURNING *",
        )
        .bind(task.id)
        .bind(expected.status)
        .bind(expected.revision)
        .bind(task.status)
        .bind(&task.result)
        .bind(&task.error_message)
        .bind(task.retry_count)
        .bind(task.scheduled_at)
        .bind(task.started_at)
        .bind(task.completed_at)
        .bind(task.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to update task"))
    }

    async fn list(
        &self,
        filter: &TaskFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Task>> {
        const WHERE: &str =
            "WHERE ($1::text IS NULL OR device_id = $1) AND ($2::task_status IS NULL OR status = $2)";

        let count_sql = format!("SELECT COUNT(*) FROM tasks {WHERE}");
        let page_sql = format!(
            "SELECT * FROM tasks {WHERE} ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        );

        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(filter.device_id.as_ref())
            .bind(filter.status)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to count tasks"))?;

        let tasks = sqlx::query_as::<_, Task>(&page_sql)
            .bind(filter.device_id.as_ref())
            .bind(filter.status)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to list tasks"))?;

        Ok(PageResponse::new(tasks, page, total as u64))
    }

    async fn stats(&self, device_id: Option<&DeviceId>) -> AppResult<TaskStats> {
        let rows: Vec<(TaskStatus, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM tasks \
             WHERE ($1::text IS NULL OR device_id = $1) GROUP BY status",
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to count tasks by status"))?;

        let mut stats = TaskStats::default();
        for (status, count) in rows {
            stats.record(status, count as u64);
        }
        Ok(stats)
    }

    async fn find_stale_running(
        &self,
        started_before: DateTime<Utc>,
        limit: u32,
    ) -> AppResult<Vec<Task>> {
        sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE status = 'running' AND started_at < $1 \
             ORDER BY started_at ASC LIMIT $2",
        )
        .bind(started_before)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to find stale running tasks"))
    }

    async fn delete_created_before(
        &self,
        created_before: DateTime<Utc>,
        statuses: &[TaskStatus],
    ) -> AppResult<u64> {
        if statuses.is_empty() {
            return Ok(0);
        }
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let result = sqlx::query(
            "DELETE FROM tasks WHERE created_at < $1 AND status::text = ANY($2)",
        )
        .bind(created_before)
        .bind(&statuses)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to delete tasks"))?;
        Ok(result.rows_affected())
    }
}
