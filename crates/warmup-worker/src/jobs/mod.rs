//! Built-in sweeps.

pub mod offline_devices;
pub mod stale_tasks;
pub mod task_retention;

pub use offline_devices::OfflineDevicesSweep;
pub use stale_tasks::StaleTasksSweep;
pub use task_retention::TaskRetentionSweep;
