//! Device registry service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use warmup_core::error::AppError;
use warmup_core::events::{DeviceEvent, DomainEvent};
use warmup_core::result::AppResult;
use warmup_core::traits::{DeviceRegistry, EventPublisher};
use warmup_core::types::id::DeviceId;
use warmup_core::types::pagination::{PageRequest, PageResponse};
use warmup_database::store::DeviceStore;
use warmup_entity::device::Device;

/// Owns device identity and liveness.
#[derive(Clone)]
pub struct DeviceService {
    devices: Arc<dyn DeviceStore>,
    publisher: Arc<dyn EventPublisher>,
}

impl std::fmt::Debug for DeviceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceService").finish_non_exhaustive()
    }
}

impl DeviceService {
    /// Creates a new device service.
    pub fn new(devices: Arc<dyn DeviceStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { devices, publisher }
    }

    /// Registers a device or refreshes an existing one. Marks it online.
    pub async fn register(&self, device_id: &str, name: Option<&str>) -> AppResult<Device> {
        let device_id = DeviceId::parse(device_id)?;
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        let device = self.devices.upsert(&device_id, name, Utc::now()).await?;

        info!(device_id = %device.device_id, name = ?device.name, "Device registered");
        self.emit(DomainEvent::device(DeviceEvent::DeviceRegistered {
            device_id: device.device_id.clone(),
            name: device.name.clone(),
        }))
        .await;
        Ok(device)
    }

    /// Records a heartbeat from a known device.
    pub async fn heartbeat(&self, device_id: &str) -> AppResult<Device> {
        let device_id = DeviceId::parse(device_id)?;
        let device = self
            .devices
            .touch(&device_id, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Device {device_id} is not registered")))?;
        debug!(device_id = %device.device_id, "Heartbeat");
        Ok(device)
    }

    /// Gets a device by ID.
    pub async fn get(&self, device_id: &str) -> AppResult<Device> {
        let device_id = DeviceId::parse(device_id)?;
        self.devices
            .find_by_id(&device_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Device {device_id} not found")))
    }

    /// Lists devices ordered by ID.
    pub async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<Device>> {
        self.devices.list(page).await
    }

    /// Marks devices not seen since `cutoff` as offline. Returns how many
    /// flipped.
    pub async fn mark_offline_stale(&self, cutoff: DateTime<Utc>) -> AppResult<usize> {
        let device_ids = self.devices.mark_offline_before(cutoff, Utc::now()).await?;
        let count = device_ids.len();
        if count > 0 {
            info!(count, "Marked stale devices offline");
            self.emit(DomainEvent::device(DeviceEvent::DevicesOffline { device_ids }))
                .await;
        }
        Ok(count)
    }

    async fn emit(&self, event: DomainEvent) {
        let name = event.name();
        if let Err(e) = self.publisher.publish(event).await {
            tracing::warn!(event = name, error = %e, "Failed to publish device event");
        }
    }
}

#[async_trait]
impl DeviceRegistry for DeviceService {
    async fn device_exists(&self, device_id: &DeviceId) -> AppResult<bool> {
        Ok(self.devices.find_by_id(device_id).await?.is_some())
    }

    async fn is_online(&self, device_id: &DeviceId) -> AppResult<bool> {
        Ok(self
            .devices
            .find_by_id(device_id)
            .await?
            .is_some_and(|d| d.is_online))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use warmup_core::error::ErrorKind;
    use warmup_core::traits::NoopPublisher;
    use warmup_database::memory::MemoryDeviceStore;

    fn service() -> DeviceService {
        DeviceService::new(Arc::new(MemoryDeviceStore::new()), Arc::new(NoopPublisher))
    }

    #[tokio::test]
    async fn register_then_heartbeat() {
        let svc = service();
        let device = svc.register("phone-1", Some("  Pixel 7 ")).await.expect("register");
        assert!(device.is_online);
        assert_eq!(device.name.as_deref(), Some("Pixel 7"));

        let beat = svc.heartbeat("phone-1").await.expect("heartbeat");
        assert!(beat.last_seen >= device.last_seen);
        assert!(svc.device_exists(&device.device_id).await.expect("exists"));
    }

    #[tokio::test]
    async fn heartbeat_from_unknown_device_is_not_found() {
        let err = service().heartbeat("phone-9").await.expect_err("unknown");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn malformed_device_id_is_rejected() {
        let err = service().register("bad id!", None).await.expect_err("invalid");
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn stale_devices_go_offline() {
        let svc = service();
        let device = svc.register("phone-1", None).await.expect("register");

        let none = svc
            .mark_offline_stale(Utc::now() - Duration::minutes(5))
            .await
            .expect("sweep");
        assert_eq!(none, 0);

        let marked = svc
            .mark_offline_stale(Utc::now() + Duration::seconds(1))
            .await
            .expect("sweep");
        assert_eq!(marked, 1);
        assert!(!svc.is_online(&device.device_id).await.expect("online"));
    }
}
