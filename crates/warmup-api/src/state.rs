//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use warmup_core::config::AppConfig;
use warmup_core::traits::EventPublisher;
use warmup_database::Persistence;
use warmup_realtime::{MemoryPubSub, TaskEventBroadcaster};
use warmup_service::{DeviceService, TaskLifecycleManager};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Task and device stores
    pub persistence: Persistence,
    /// Broadcast channels behind the WebSocket endpoint
    pub pubsub: Arc<MemoryPubSub>,

    // ── Services ─────────────────────────────────────────────
    /// Task lifecycle manager
    pub tasks: Arc<TaskLifecycleManager>,
    /// Device registry
    pub devices: Arc<DeviceService>,

    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Wire services over an opened persistence backend. Events go to a
    /// fresh in-process broadcaster.
    pub fn build(config: Arc<AppConfig>, persistence: Persistence) -> Self {
        let pubsub = Arc::new(MemoryPubSub::new(config.realtime.channel_buffer_size));
        let publisher: Arc<dyn EventPublisher> =
            Arc::new(TaskEventBroadcaster::new(Arc::clone(&pubsub)));

        let devices = Arc::new(DeviceService::new(
            Arc::clone(&persistence.devices),
            Arc::clone(&publisher),
        ));
        let tasks = Arc::new(TaskLifecycleManager::new(
            Arc::clone(&persistence.tasks),
            devices.clone(),
            publisher,
            config.tasks.clone(),
        ));

        Self {
            config,
            persistence,
            pubsub,
            tasks,
            devices,
            started_at: Instant::now(),
        }
    }
}
