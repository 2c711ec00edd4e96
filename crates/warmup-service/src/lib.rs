//! # warmup-service
//!
//! Business logic for the warmup backend. [`TaskLifecycleManager`] is the
//! only component allowed to change a task's status; [`DeviceService`] owns
//! device identity and liveness and serves the registry view the lifecycle
//! manager reads.
//!
//! Services follow constructor injection: stores, the registry and the
//! event publisher are handed in as `Arc`s at construction time.

pub mod backoff;
pub mod device;
pub mod task;

pub use backoff::BackoffPolicy;
pub use device::DeviceService;
pub use task::{NewTask, TaskLifecycleManager};
