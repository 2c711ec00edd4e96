//! Read-only view of the device registry.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::DeviceId;

/// What the task lifecycle needs to know about devices.
///
/// Liveness is owned by the registry; consumers of this trait never
/// mutate it.
#[async_trait]
pub trait DeviceRegistry: Send + Sync + 'static {
    /// Whether the device has ever registered.
    async fn device_exists(&self, device_id: &DeviceId) -> AppResult<bool>;

    /// Whether the device is currently considered online.
    async fn is_online(&self, device_id: &DeviceId) -> AppResult<bool>;
}
