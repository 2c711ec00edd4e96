//! Route handlers, one module per route group.

pub mod android;
pub mod devices;
pub mod health;
pub mod tasks;
pub mod ws;

use axum::Json;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;

/// What every JSON handler returns.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap `data` in the success envelope.
pub(crate) fn ok<T: serde::Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}
