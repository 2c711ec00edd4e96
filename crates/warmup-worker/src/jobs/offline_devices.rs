//! Offline device sweep.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;

use warmup_core::result::AppResult;
use warmup_service::DeviceService;

use crate::sweep::SweepJob;

/// Marks devices without a recent heartbeat as offline.
#[derive(Debug)]
pub struct OfflineDevicesSweep {
    devices: Arc<DeviceService>,
    offline_after_minutes: i64,
    schedule: String,
}

impl OfflineDevicesSweep {
    /// Create the sweep.
    pub fn new(devices: Arc<DeviceService>, offline_after_minutes: i64, schedule: String) -> Self {
        Self {
            devices,
            offline_after_minutes,
            schedule,
        }
    }
}

#[async_trait]
impl SweepJob for OfflineDevicesSweep {
    fn name(&self) -> &str {
        "offline_devices"
    }

    fn schedule(&self) -> &str {
        &self.schedule
    }

    async fn run(&self) -> AppResult<Value> {
        let cutoff = Utc::now() - Duration::minutes(self.offline_after_minutes);
        let marked = self.devices.mark_offline_stale(cutoff).await?;

        Ok(serde_json::json!({
            "sweep": "offline_devices",
            "marked_offline": marked,
            "offline_after_minutes": self.offline_after_minutes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warmup_core::traits::DeviceRegistry;
    use warmup_core::types::id::DeviceId;

    use crate::jobs::fixture::fixture;

    #[tokio::test]
    async fn recent_devices_stay_online() {
        let f = fixture().await;
        let sweep = OfflineDevicesSweep::new(f.devices.clone(), 5, "0 * * * * *".into());
        let summary = sweep.run().await.expect("sweep");
        assert_eq!(summary["marked_offline"], 0);

        let id = DeviceId::parse("phone-1").expect("id");
        assert!(f.devices.is_online(&id).await.expect("online"));
    }
}
