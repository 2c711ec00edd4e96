//! In-memory device store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use warmup_core::result::AppResult;
use warmup_core::types::id::DeviceId;
use warmup_core::types::pagination::{PageRequest, PageResponse};
use warmup_entity::device::Device;

use super::paginate;
use crate::store::DeviceStore;

/// Devices held in a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryDeviceStore {
    devices: DashMap<DeviceId, Device>,
}

impl MemoryDeviceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceStore for MemoryDeviceStore {
    async fn upsert(
        &self,
        device_id: &DeviceId,
        name: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<Device> {
        let device = match self.devices.entry(device_id.clone()) {
            Entry::Occupied(mut existing) => {
                let device = existing.get_mut();
                if let Some(name) = name {
                    device.name = Some(name.to_string());
                }
                device.is_online = true;
                device.last_seen = now;
                device.updated_at = now;
                device.clone()
            }
            Entry::Vacant(slot) => slot
                .insert(Device::register(
                    device_id.clone(),
                    name.map(str::to_string),
                    now,
                ))
                .clone(),
        };
        Ok(device)
    }

    async fn touch(&self, device_id: &DeviceId, now: DateTime<Utc>) -> AppResult<Option<Device>> {
        Ok(self.devices.get_mut(device_id).map(|mut device| {
            device.is_online = true;
            device.last_seen = now;
            device.updated_at = now;
            device.clone()
        }))
    }

    async fn find_by_id(&self, device_id: &DeviceId) -> AppResult<Option<Device>> {
        Ok(self.devices.get(device_id).map(|d| d.clone()))
    }

    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<Device>> {
        let mut devices: Vec<Device> = self.devices.iter().map(|d| d.clone()).collect();
        devices.sort_by(|a, b| a.device_id.as_str().cmp(b.device_id.as_str()));
        Ok(paginate(devices, page))
    }

    async fn mark_offline_before(
        &self,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<DeviceId>> {
        let mut marked = Vec::new();
        for mut device in self.devices.iter_mut() {
            if device.is_online && device.is_stale(cutoff) {
                device.is_online = false;
                device.updated_at = now;
                marked.push(device.device_id.clone());
            }
        }
        marked.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(marked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn id(raw: &str) -> DeviceId {
        DeviceId::parse(raw).expect("valid device id")
    }

    #[tokio::test]
    async fn upsert_keeps_name_when_none_given() {
        let store = MemoryDeviceStore::new();
        let now = Utc::now();
        store
            .upsert(&id("phone-1"), Some("Pixel"), now)
            .await
            .expect("register");
        let again = store
            .upsert(&id("phone-1"), None, now + Duration::seconds(5))
            .await
            .expect("re-register");
        assert_eq!(again.name.as_deref(), Some("Pixel"));
        assert_eq!(again.created_at, now);
        assert_eq!(again.last_seen, now + Duration::seconds(5));
    }

    #[tokio::test]
    async fn touch_unknown_device_returns_none() {
        let store = MemoryDeviceStore::new();
        let touched = store.touch(&id("ghost"), Utc::now()).await.expect("touch");
        assert!(touched.is_none());
    }

    #[tokio::test]
    async fn mark_offline_only_flips_stale_online_devices() {
        let store = MemoryDeviceStore::new();
        let now = Utc::now();
        store
            .upsert(&id("old"), None, now - Duration::minutes(10))
            .await
            .expect("register");
        store.upsert(&id("fresh"), None, now).await.expect("register");

        let marked = store
            .mark_offline_before(now - Duration::minutes(5), now)
            .await
            .expect("sweep");
        assert_eq!(marked, vec![id("old")]);

        let again = store
            .mark_offline_before(now - Duration::minutes(5), now)
            .await
            .expect("sweep");
        assert!(again.is_empty());

        let old = store.find_by_id(&id("old")).await.expect("find").expect("exists");
        assert!(!old.is_online);
    }
}
