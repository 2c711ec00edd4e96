//! Device repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use warmup_core::error::{AppError, ErrorKind};
use warmup_core::result::AppResult;
use warmup_core::types::id::DeviceId;
use warmup_core::types::pagination::{PageRequest, PageResponse};
use warmup_entity::device::Device;

use crate::store::DeviceStore;

/// Device rows in PostgreSQL.
#[derive(Debug, Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    /// Create a new device repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceStore for DeviceRepository {
    async fn upsert(
        &self,
        device_id: &DeviceId,
        name: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<Device> {
        sqlx::query_as::<_, Device>(
            "INSERT INTO devices (device_id, name, is_online, last_seen, created_at, updated_at) \
             VALUES ($1, $2, TRUE, $3, $3, $3) \
             ON CONFLICT (device_id) DO UPDATE SET \
                name = COALESCE(EXCLUDED.name, devices.name), \
                is_online = TRUE, last_seen = EXCLUDED.last_seen, updated_at = EXCLUDED.updated_at \
             RETURNING *",
        )
        .bind(device_id)
        .bind(name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::PersistenceUnavailable, "Failed to register device", e)
        })
    }

    async fn touch(&self, device_id: &DeviceId, now: DateTime<Utc>) -> AppResult<Option<Device>> {
        sqlx::query_as::<_, Device>(
            "UPDATE devices SET is_online = TRUE, last_seen = $2, updated_at = $2 \
             WHERE device_id = $1 RETURNING *",
        )
        .bind(device_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::PersistenceUnavailable, "Failed to record heartbeat", e)
        })
    }

    async fn find_by_id(&self, device_id: &DeviceId) -> AppResult<Option<Device>> {
        sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE device_id = $1")
            .bind(device_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::PersistenceUnavailable, "Failed to find device", e)
            })
    }

    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<Device>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM devices")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::PersistenceUnavailable, "Failed to count devices", e)
            })?;

        let devices = sqlx::query_as::<_, Device>(
            "SELECT * FROM devices ORDER BY device_id ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::PersistenceUnavailable, "Failed to list devices", e)
        })?;

        Ok(PageResponse::new(devices, page, total as u64))
    }

    async fn mark_offline_before(
        &self,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<DeviceId>> {
        sqlx::query_scalar::<_, DeviceId>(
            "UPDATE devices SET is_online = FALSE, updated_at = $2 \
             WHERE is_online AND last_seen < $1 RETURNING device_id",
        )
        .bind(cutoff)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::PersistenceUnavailable,
                "Failed to mark stale devices offline",
                e,
            )
        })
    }
}
