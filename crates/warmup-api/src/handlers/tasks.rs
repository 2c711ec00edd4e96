//! Operator task endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{Duration, Utc};
use validator::Validate;

use warmup_core::error::AppError;
use warmup_core::types::id::{DeviceId, TaskId};
use warmup_core::types::pagination::{PageRequest, PageResponse};
use warmup_entity::task::{Task, TaskFilter, TaskStats, TaskStatus};
use warmup_service::NewTask;

use super::{ApiResult, ok};
use crate::dto::request::{
    BatchCreateRequest, CreateTaskRequest, ListTasksQuery, PurgeRequest, StatsQuery,
};
use crate::dto::response::{BatchCreateResponse, PurgeResponse};
use crate::extractors::PaginationParams;
use crate::state::AppState;

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Task> {
    req.validate()?;
    ok(state.tasks.create(NewTask::from(req)).await?)
}

/// POST /api/tasks/batch
pub async fn create_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchCreateRequest>,
) -> ApiResult<BatchCreateResponse> {
    req.validate()?;
    let inputs = req.tasks.into_iter().map(NewTask::from).collect();
    ok(BatchCreateResponse::from(state.tasks.create_batch(inputs).await))
}

/// GET /api/tasks?device_id=&status=&page=&page_size=
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<PageResponse<Task>> {
    let filter = TaskFilter {
        device_id: query.device_id.map(DeviceId::parse).transpose()?,
        status: query.status.as_deref().map(str::parse).transpose()?,
    };
    let defaults = PaginationParams::default();
    let page = PageRequest::new(
        query.page.unwrap_or(defaults.page),
        query.page_size.unwrap_or(defaults.page_size),
    );
    ok(state.tasks.list(&filter, &page).await?)
}

/// GET /api/tasks/stats?device_id=
pub async fn stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<TaskStats> {
    ok(state.tasks.stats(query.device_id.as_deref()).await?)
}

/// GET /api/tasks/{id}
pub async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Task> {
    let id: TaskId = id.parse()?;
    ok(state.tasks.get(id).await?)
}

/// POST /api/tasks/{id}/retry
pub async fn retry_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Task> {
    let id: TaskId = id.parse()?;
    ok(state.tasks.retry(id).await?)
}

/// POST /api/tasks/purge
pub async fn purge(
    State(state): State<AppState>,
    Json(req): Json<PurgeRequest>,
) -> ApiResult<PurgeResponse> {
    req.validate()?;
    let statuses = match req.statuses {
        Some(raw) if !raw.is_empty() => raw
            .iter()
            .map(|s| s.parse::<TaskStatus>())
            .collect::<Result<Vec<_>, AppError>>()?,
        _ => TaskStatus::TERMINAL.to_vec(),
    };
    let older_than = Utc::now() - Duration::days(req.older_than_days);
    let deleted = state.tasks.purge(older_than, &statuses).await?;
    ok(PurgeResponse { deleted })
}
