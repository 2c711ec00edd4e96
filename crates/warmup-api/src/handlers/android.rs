//! Device-facing endpoints polled by the Android agents.

use axum::Json;
use axum::extract::{Path, Query, State};
use validator::Validate;

use warmup_core::types::id::TaskId;
use warmup_entity::device::Device;
use warmup_entity::task::Task;

use super::{ApiResult, ok};
use crate::dto::request::{
    CompleteTaskRequest, FailTaskRequest, HeartbeatRequest, PollQuery, RegisterDeviceRequest,
};
use crate::state::AppState;

/// POST /api/android/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterDeviceRequest>,
) -> ApiResult<Device> {
    req.validate()?;
    let device = state
        .devices
        .register(&req.device_id, req.name.as_deref())
        .await?;
    ok(device)
}

/// POST /api/android/heartbeat
pub async fn heartbeat(
    State(state): State<AppState>,
    Json(req): Json<HeartbeatRequest>,
) -> ApiResult<Device> {
    req.validate()?;
    ok(state.devices.heartbeat(&req.device_id).await?)
}

/// GET /api/android/task/poll?device_id=&limit=
///
/// Counts as a heartbeat, then dispatches.
pub async fn poll(
    State(state): State<AppState>,
    Query(query): Query<PollQuery>,
) -> ApiResult<Vec<Task>> {
    query.validate()?;
    state.devices.heartbeat(&query.device_id).await?;
    ok(state.tasks.dispatch(&query.device_id, query.limit).await?)
}

/// POST /api/android/task/{id}/complete
pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<CompleteTaskRequest>>,
) -> ApiResult<Task> {
    let id: TaskId = id.parse()?;
    let req = body.map(|Json(req)| req).unwrap_or_default();
    ok(state.tasks.complete(id, req.result).await?)
}

/// POST /api/android/task/{id}/fail
pub async fn fail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<FailTaskRequest>,
) -> ApiResult<Task> {
    req.validate()?;
    let id: TaskId = id.parse()?;
    ok(state.tasks.fail(id, &req.error).await?)
}
