//! Operator device endpoints.

use axum::extract::{Path, Query, State};

use warmup_core::types::pagination::PageResponse;
use warmup_entity::device::Device;

use super::{ApiResult, ok};
use crate::extractors::PaginationParams;
use crate::state::AppState;

/// GET /api/devices?page=&page_size=
pub async fn list_devices(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PageResponse<Device>> {
    ok(state.devices.list(&params.into_page_request()).await?)
}

/// GET /api/devices/{id}
pub async fn get_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Device> {
    ok(state.devices.get(&id).await?)
}
